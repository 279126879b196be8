use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let output_arg = || {
        clap::arg!(-o --output <FILE> "Output file (default: stdout)")
            .value_name("FILE")
            .value_parser(clap::value_parser!(std::path::PathBuf))
    };

    let mut cmd = clap::Command::new("trailmark")
        .version("0.1.0")
        .about("Turn walking-route pages into normalized walk records")
        .arg(clap::arg!(--seed <N> "Seed for coordinate jitter and sampled values").global(true))
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .arg(clap::arg!(--pretty "Pretty-print JSON output").global(true))
        .subcommand(
            clap::Command::new("page")
                .about("Extract one walk page into a record")
                .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
                .arg(clap::arg!(--"source-url" <URL> "Source URL for file or stdin input; sets the region"))
                .arg(output_arg())
                .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("15"))
                .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").value_name("UA")),
        )
        .subcommand(
            clap::Command::new("convert")
                .about("Convert listing rows JSON into records")
                .arg(clap::arg!(<ROWS> "Listing rows JSON file, or '-' for stdin"))
                .arg(output_arg()),
        )
        .subcommand(
            clap::Command::new("listing")
                .about("Extract walk rows from a region listing page")
                .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
                .arg(clap::arg!(--region <KEY> "Source-site region key, e.g. skye").required(true))
                .arg(clap::arg!(--limit <N> "Keep only the N easiest, shortest walks"))
                .arg(output_arg()),
        )
        .subcommand(
            clap::Command::new("crawl")
                .about("Fetch and process walk pages in paced batches")
                .arg(clap::arg!(<URLS> "Listing rows JSON file with source_url fields"))
                .arg(clap::arg!(--priority "Fetch URLs matching priority keywords first"))
                .arg(clap::arg!(--start <N> "Index of the first URL to process").default_value("0"))
                .arg(clap::arg!(--"batch-size" <N> "URLs per checkpointed batch"))
                .arg(clap::arg!(--delay <SECS> "Pause between requests in seconds"))
                .arg(
                    clap::arg!(--config <FILE> "Batch config JSON file")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(output_arg()),
        )
        .subcommand(
            clap::Command::new("completions")
                .about("Generate shell completion script")
                .arg(clap::arg!(<SHELL> "Target shell").value_parser(["bash", "zsh", "fish", "powershell"])),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "trailmark", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "trailmark", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "trailmark", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "trailmark", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
