pub const UNSPLASH_API: &str = "https://api.unsplash.com";

pub const UNSPLASH_SITE: &str = "https://unsplash.com";

pub const USER_AGENT: &str = "Photorelay/1.0";

pub mod cache {
    use std::time::Duration;

    pub const TTL: Duration = Duration::from_secs(60 * 60);

    pub const MAX_PAGES: u64 = 1000;

    pub const PHOTOS_KIND: &str = "photos";

    pub const COLLECTIONS_KIND: &str = "collections";
}

pub mod intervals {
    use std::time::Duration;

    pub const GATE_MIN_INTERVAL: Duration = Duration::from_millis(1500);

    pub const STATS_SPACING: Duration = Duration::from_millis(50);

    pub const STATS_TIMEOUT: Duration = Duration::from_secs(10);
}

pub mod limits {

    pub const MAX_PER_PAGE: u32 = 80;

    pub const DEFAULT_PHOTOS_PER_PAGE: u32 = 50;

    pub const DEFAULT_COLLECTIONS_PER_PAGE: u32 = 10;
}
