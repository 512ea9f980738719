pub mod span_config;
pub mod toml_config;

pub use span_config::{BoostCfg, IsdnCfg, IsdnDialect, LinkRole, SignalMode, SpanConfig};
