//! Static application identity.

/// Application name, version, and project home page.
///
/// One instance is created at startup and shared behind an `Arc`; there is no
/// way to mutate it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub home: &'static str,
}

/// The identity this application declares under `appInfo`.
pub const JEEBUS_APP_INFO: AppInfo = AppInfo {
    name: "JeeBus",
    version: "0.3.0",
    home: "https://github.com/jcw/jeebus",
};

impl Default for AppInfo {
    fn default() -> Self {
        JEEBUS_APP_INFO
    }
}
