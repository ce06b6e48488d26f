pub mod inetd_conf;
pub mod services_db;
pub mod settings;

pub use settings::Settings;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "small-inetd")]
#[command(about = "An inetd-like server that hands incoming sockets to other programs")]
pub struct CliConfig {
    /// Service configuration file
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Don't run internal services
    #[arg(short = 'i', long = "nointernal")]
    pub no_internal: bool,

    /// DEPRECATED. RPC procedure table file
    #[arg(short = 'r', long = "rpc", hide = true)]
    pub rpc: Option<String>,

    /// Services database used to map service names to ports
    #[arg(long)]
    pub services_file: Option<String>,

    /// Address every listener binds to
    #[arg(long)]
    pub bind_address: Option<String>,

    /// Optional TOML settings file
    #[arg(long, env = "SMALL_INETD_SETTINGS")]
    pub settings: Option<String>,

    /// Provision and report without starting listeners
    #[arg(long)]
    pub check: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔 (若有)，再套用命令列覆蓋
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        self.apply_to(&mut settings);
        Ok(settings)
    }

    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(file) = &self.file {
            settings.inetd.file = file.clone();
        }
        if let Some(services_file) = &self.services_file {
            settings.inetd.services_file = services_file.clone();
        }
        if let Some(bind_address) = &self.bind_address {
            settings.inetd.bind_address = bind_address.clone();
        }
        if self.no_internal {
            settings.inetd.no_internal = true;
        }
        if self.verbose {
            settings.logging.verbose = true;
        }
        if self.json_logs {
            settings.logging.json = true;
        }
    }
}
