use clap::Parser;
use std::path::PathBuf;
use twsparql::Options;

#[derive(Parser, Debug)]
#[command(
    name = "twsparql",
    bin_name = "twsparql",
    version,
    disable_help_flag = true
)]
#[command(about = "Render documents with embedded SPARQL markers", long_about = None)]
pub struct Cli {
    /// Configuration file with iBase, sBase, xsltPath, queryPath and endpoint
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Input file containing sparql tags
    #[arg(long, value_name = "INPUT_FILE")]
    pub input: Option<PathBuf>,

    /// File to write output to (default: stdout)
    #[arg(long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// URI of the query file
    #[arg(long, value_name = "QUERY_URI")]
    pub query: Option<String>,

    /// URI of the xslt file
    #[arg(long, value_name = "XSLT_URI")]
    pub xslt: Option<String>,

    /// Instance or schema URI
    #[arg(long, value_name = "INSTANCE_URI")]
    pub uri: Option<String>,

    /// SPARQL endpoint, overrides the configuration file
    #[arg(long, value_name = "ENDPOINT_URI")]
    pub endpoint: Option<String>,

    /// Write status and warnings to ./twsparql.log
    #[arg(long)]
    pub enable_debug: bool,

    /// Print help
    #[arg(short, long)]
    pub help: bool,
}

impl From<Cli> for Options {
    fn from(cli: Cli) -> Self {
        Options {
            config: cli.config,
            input: cli.input,
            output: cli.output,
            query: cli.query,
            xslt: cli.xslt,
            uri: cli.uri,
            endpoint: cli.endpoint,
            enable_debug: cli.enable_debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("twsparql").chain(args.iter().copied()))
    }

    #[test]
    fn test_equals_syntax() {
        let cli = parse(&[
            "--config=site.ini",
            "--query=q.rq",
            "--xslt=t.xsl",
            "--uri=p1",
            "--endpoint=http://e/sparql",
            "--output=out.html",
            "--enable-debug",
        ])
        .unwrap();
        let opts = Options::from(cli);
        assert_eq!(opts.config, Some(PathBuf::from("site.ini")));
        assert_eq!(opts.query.as_deref(), Some("q.rq"));
        assert_eq!(opts.xslt.as_deref(), Some("t.xsl"));
        assert_eq!(opts.uri.as_deref(), Some("p1"));
        assert_eq!(opts.endpoint.as_deref(), Some("http://e/sparql"));
        assert_eq!(opts.output, Some(PathBuf::from("out.html")));
        assert!(opts.enable_debug);
    }

    #[test]
    fn test_space_syntax() {
        let cli = parse(&["--config", "site.ini", "--input", "doc.xml"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("doc.xml")));
        assert!(!cli.enable_debug);
    }

    #[test]
    fn test_no_arguments_parse() {
        let opts = Options::from(parse(&[]).unwrap());
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_unknown_option_fails() {
        let err = parse(&["--frobnicate"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_repeated_query_fails() {
        let err = parse(&["--query=a", "--query=b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_help_flag() {
        assert!(parse(&["-h"]).unwrap().help);
        assert!(parse(&["--help"]).unwrap().help);
    }
}
