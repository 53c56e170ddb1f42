/// 资源路径（相对于 API 基础地址）
pub const PATH_PLAYERS: &str = "/players";
pub const PATH_EVENTS: &str = "/events";
pub const PATH_INSIGHTS: &str = "/insights";
pub const PATH_AUTH_LOGIN: &str = "/auth/login";
pub const PATH_AUTH_VERIFY: &str = "/auth/verify";
pub const PATH_UPLOAD: &str = "/upload";

pub fn path_players_id(id: &str) -> String {
    format!("{}/{}", PATH_PLAYERS, id)
}

pub fn path_events_id(id: &str) -> String {
    format!("{}/{}", PATH_EVENTS, id)
}

pub fn path_insights_id(id: &str) -> String {
    format!("{}/{}", PATH_INSIGHTS, id)
}

pub fn join(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// 图片静态资源挂在主机根路径下，不在 /api 下
pub fn asset_host(base_url: &str) -> &str {
    let base = base_url.trim_end_matches('/');
    base.strip_suffix("/api").unwrap_or(base)
}

pub fn image_url(base_url: &str, path: &str) -> String {
    let p = path.trim();
    if p.starts_with("http://") || p.starts_with("https://") {
        return p.to_string();
    }
    let p = p.replace('\\', "/");
    join(asset_host(base_url), &p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_normalizes_slashes() {
        assert_eq!(
            join("http://localhost:5000/api/", "/players"),
            "http://localhost:5000/api/players"
        );
        assert_eq!(path_players_id("12"), "/players/12");
    }

    #[test]
    fn image_urls() {
        let base = "http://localhost:5000/api";
        assert_eq!(
            image_url(base, "uploads/players/a.jpg"),
            "http://localhost:5000/uploads/players/a.jpg"
        );
        assert_eq!(
            image_url(base, "\\uploads\\b.png"),
            "http://localhost:5000/uploads/b.png"
        );
        assert_eq!(
            image_url(base, "https://cdn.example.org/c.jpg"),
            "https://cdn.example.org/c.jpg"
        );
        assert_eq!(asset_host("https://x.org"), "https://x.org");
    }
}
