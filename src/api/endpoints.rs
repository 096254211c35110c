//! Path builders for the backend's REST surface, kept in one place so no
//! caller formats paths by hand.

pub const WORKSPACES: &str = "/api/workspaces";
pub const ACCESS_TOKEN: &str = "/api/workspaces/access-token";
pub const CURRENT_WORKSPACE: &str = "/api/workspaces/current";
pub const CAMPAIGNS: &str = "/api/campaigns";
pub const PLATFORM_CONNECT: &str = "/api/platforms/connect";

pub fn campaign(id: u64) -> String {
    format!("{CAMPAIGNS}/{id}")
}

pub fn campaign_tokenomics(id: u64) -> String {
    format!("{CAMPAIGNS}/tokenomics/{id}")
}

pub fn campaign_technical(id: u64) -> String {
    format!("{CAMPAIGNS}/technical/{id}")
}

pub fn campaign_market(id: u64) -> String {
    format!("{CAMPAIGNS}/market/{id}")
}

pub fn campaign_settings(id: u64) -> String {
    format!("{CAMPAIGNS}/settings/{id}")
}

pub fn toggle_publish(id: u64) -> String {
    format!("{CAMPAIGNS}/toggle-publish/{id}")
}

pub fn platform_callback(platform: &str) -> String {
    format!("/api/platforms/callbacks/{platform}")
}

pub fn platform_statuses(campaign_id: u64) -> String {
    format!("/api/platforms/statuses/{campaign_id}")
}

pub fn platform_disconnect(connection_id: u64) -> String {
    format!("/api/platforms/disconnect/{connection_id}")
}
