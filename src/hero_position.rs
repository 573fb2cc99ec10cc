use url::Url;

pub const HERO_POSITION_ENDPOINT: &str = "https://mlbb-stats.ridwaanhall.com/api/hero-position/";

/// Query parameters of the hero-position endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroPositionQuery {
    pub role: String,
    pub lane: String,
    pub size: u32,
    pub index: u32,
}

impl Default for HeroPositionQuery {
    fn default() -> Self {
        Self {
            role: "marksman".to_string(),
            lane: "gold".to_string(),
            size: 130,
            index: 1,
        }
    }
}

impl HeroPositionQuery {
    pub fn url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(HERO_POSITION_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("role", &self.role)
            .append_pair("lane", &self.lane)
            .append_pair("size", &self.size.to_string())
            .append_pair("index", &self.index.to_string());
        Ok(url)
    }
}
