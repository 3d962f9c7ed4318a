use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sigscan-info")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Config file to use instead of `<config dir>/sigscan-info.toml`
    pub config: Option<PathBuf>,

    /// Skip scanning a test buffer with every available backend
    #[arg(long)]
    pub no_check: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_optional() {
        let args = Args::try_parse_from(["sigscan-info"]).unwrap();
        assert_eq!(args.config, None);
        assert!(!args.no_check);

        let args = Args::try_parse_from(["sigscan-info", "custom.toml", "--no-check"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert!(args.no_check);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Args::try_parse_from(["sigscan-info", "--verbose"]).is_err());
    }
}
