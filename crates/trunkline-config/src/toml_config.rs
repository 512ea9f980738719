use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use trunkline_core::TrunkType;

use super::span_config::{BoostCfg, IsdnCfg, IsdnDialect, LinkRole, SignalMode, SpanConfig};

/// Build a `SpanConfig` from a TOML configuration string
pub fn from_toml_str(toml_str: &str) -> Result<SpanConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    let expected_config_version = "0.3";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }

    let mut cfg = SpanConfig::new(root.span.span_id, root.span.trunk_type, root.span.signal_mode);
    cfg.debug_log = root.debug_log;

    if let Some(boost) = root.boost {
        cfg.boost = Some(apply_boost_patch(boost));
    }
    if let Some(isdn) = root.isdn {
        cfg.isdn = Some(apply_isdn_patch(isdn));
    }

    cfg.validate().map_err(|e| format!("Invalid span configuration: {}", e))?;

    Ok(cfg)
}

/// Build a `SpanConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SpanConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build a `SpanConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SpanConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    from_reader(r)
}

fn apply_boost_patch(src: BoostDto) -> BoostCfg {
    let mut dst = BoostCfg::default();
    if let Some(v) = src.local_ip {
        dst.local_ip = v;
    }
    if let Some(v) = src.local_port {
        dst.local_port = v;
    }
    if let Some(v) = src.remote_ip {
        dst.remote_ip = v;
    }
    if let Some(v) = src.remote_port {
        dst.remote_port = v;
    }
    if let Some(v) = src.request_timeout_ms {
        dst.request_timeout_ms = v;
    }
    dst
}

fn apply_isdn_patch(src: IsdnDto) -> IsdnCfg {
    let mut dst = IsdnCfg::default();
    if let Some(v) = src.role {
        dst.role = v;
    }
    if let Some(v) = src.dialect {
        dst.dialect = v;
    }
    if let Some(v) = src.suggest_channel {
        dst.suggest_channel = v;
    }
    dst
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,
    span: SpanDto,
    boost: Option<BoostDto>,
    isdn: Option<IsdnDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpanDto {
    span_id: u32,
    trunk_type: TrunkType,
    signal_mode: SignalMode,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoostDto {
    local_ip: Option<String>,
    local_port: Option<u16>,
    remote_ip: Option<String>,
    remote_port: Option<u16>,
    request_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IsdnDto {
    role: Option<LinkRole>,
    dialect: Option<IsdnDialect>,
    suggest_channel: Option<bool>,
}
