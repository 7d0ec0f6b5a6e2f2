#![deny(warnings)]
pub mod belief;
pub mod game;
pub mod model;
pub mod random;
pub mod sensor;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "ghostbust"
    }

    pub const fn codename() -> &'static str {
        "Bayes Sweep"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "ghostbust");
        assert_eq!(AppInfo::codename(), "Bayes Sweep");
        assert!(!AppInfo::version().is_empty());
    }
}
