use clap::{App, Arg, ArgMatches};

pub const DEFAULT_INTERFACE: &str = "eth0";

/// Startup settings, taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub interface: String,
    pub mapping: String,
    pub verbose: bool,
}

fn app() -> App<'static, 'static> {
    App::new("rarpd")
        .version("0.1")
        .author("Route-rs Contributors")
        .about("Answer RARP requests from a static MAC to IPv4 table")
        .arg(
            Arg::with_name("interface")
                .short("i")
                .long("interface")
                .value_name("IFACE")
                .help("Interface to bind")
                .default_value(DEFAULT_INTERFACE)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("map")
                .short("m")
                .long("map")
                .value_name("MAC=IPV4,...")
                .help("Comma-separated MAC=IPv4 assignments, e.g. 52:54:00:12:34:56=192.168.1.10")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log every frame"),
        )
}

impl Config {
    pub fn from_args() -> Self {
        Config::from_matches(&app().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Config {
            interface: matches
                .value_of("interface")
                .unwrap_or(DEFAULT_INTERFACE)
                .to_string(),
            mapping: matches.value_of("map").unwrap_or("").to_string(),
            verbose: matches.is_present("verbose"),
        }
    }
}
