use clap::{App, AppSettings, Arg, SubCommand};
use podium::build::build_site;
use podium::config::Config;
use std::error::Error;
use std::path::Path;

fn main() {
    env_logger::init();

    let matches = App::new("podium")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds a static site listing conference talks")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site")
                .arg(
                    Arg::with_name("project")
                        .short("p")
                        .long("project")
                        .takes_value(true)
                        .default_value(".")
                        .help("The project directory (or any directory below it)"),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .help("The output directory; defaults to `_site` in the project"),
                ),
        )
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("build") {
        let project = Path::new(matches.value_of("project").unwrap_or("."));
        let output = matches.value_of("output").map(Path::new);
        if let Err(e) = build(project, output) {
            let mut lines = error_chain(e.as_ref()).into_iter();
            if let Some(first) = lines.next() {
                eprintln!("Error: {}", first);
            }
            for cause in lines {
                eprintln!("  caused by: {}", cause);
            }
            std::process::exit(1);
        }
    }
}

fn build(project: &Path, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let project = std::fs::canonicalize(project)?;
    let config = Config::from_directory(&project, output)?;
    build_site(&config)?;
    Ok(())
}

// Collects the messages of `e` and its sources. A cause whose message is
// already part of the previous line is skipped.
fn error_chain(e: &(dyn Error + 'static)) -> Vec<String> {
    let mut lines: Vec<String> = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        let message = err.to_string();
        if lines.last().map_or(true, |last| !last.contains(&message)) {
            lines.push(message);
        }
        source = err.source();
    }
    lines
}
