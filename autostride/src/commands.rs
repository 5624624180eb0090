use crate::CLAP_STYLING;
use autostride_core::ComponentKind;
use clap::builder::PossibleValuesParser;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("autostride")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("autostride")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log graph building and analysis details to stderr").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("analyze")
                .about(
                    "Build a component graph from diagram detections and infer STRIDE threats \
                from it.",
                )
                .arg(
                    arg!(-i --"input" <FILE>)
                        .required(true)
                        .num_args(1..)
                        .help("Detection JSON file(s), one per diagram")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON configuration file (thresholds, class map, knowledge base)"),
                )
                .arg(
                    arg!(--"conf-threshold" <SCORE>)
                        .required(false)
                        .help("Drop detections scoring below this confidence (overrides the config)")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"include-graph")
                        .required(false)
                        .help("Include the component graph in the report")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("classes")
                .about("Show which detector class ids map to which component kinds")
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON configuration file with a custom class map"),
                ),
        )
        .subcommand(
            command!("rules")
                .about("List the per-component threat rules in the knowledge base")
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON configuration file with a custom knowledge base"),
                )
                .arg(
                    arg!(-k --"kind" <KIND>)
                        .required(false)
                        .help("Only show rules for this component kind")
                        .value_parser(PossibleValuesParser::new(
                            ComponentKind::ALL.map(|kind| kind.as_str()),
                        )),
                ),
        )
}
