use clap::Parser;
use mailstyle_lib::mail_generate::mail_style;
use mailstyle_lib::{InlineOptions, MergeMode};
use std::fs;
use std::path::{Path, PathBuf};

const MAILSTYLE_INTRO: &str = r#"
                _ _     _         _
  _ __  __ _(_) |___| |_ _  _| |___
 | '  \/ _` | | (_-<  _| || | / -_)
 |_|_|_\__,_|_|_/__/\__|\_, |_\___|
                        |__/
    CSS inlining for HTML email
"#;

#[derive(Parser)]
#[command(name = "mailstyle")]
#[command(about = "Inline CSS rules into the style attributes of HTML email")]
struct Args {
    /// Input HTML files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Extra stylesheet applied after each document's own <style> elements.
    #[arg(long)]
    css: Option<PathBuf>,

    /// Merge policy: always-append, ignore-specificity, process-specificity or standard.
    #[arg(long, default_value_t = InlineOptions::default().merge_mode)]
    mode: MergeMode,

    /// Keep <style> elements exactly as authored.
    #[arg(long)]
    keep_style_elements: bool,

    /// Directory for the output files (defaults to next to each input).
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let file_name = format!("{}.inlined.html", stem);
    match out_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

fn main() {
    env_logger::init();
    println!("{}", MAILSTYLE_INTRO);

    // parse the args given in terminal
    let args: Args = Args::parse();
    let options = InlineOptions {
        merge_mode: args.mode,
        keep_style_elements: args.keep_style_elements,
    };

    let extra_css = match &args.css {
        Some(path) => match fs::read_to_string(path) {
            Ok(css) => css,
            Err(e) => {
                eprintln!("Error reading CSS file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => String::new(),
    };

    let mut documents = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        match fs::read_to_string(input) {
            Ok(html_content) => documents.push(html_content),
            Err(e) => {
                eprintln!("Error reading HTML file {}: {}", input.display(), e);
                std::process::exit(1);
            }
        }
    }
    log::info!("inlining {} document(s) with mode {}", documents.len(), options.merge_mode);

    let mut failed = false;
    let results = mail_style::generate_batch(&documents, &extra_css, &options);
    for (input, result) in args.inputs.iter().zip(results) {
        let written = result.map_err(|e| e.to_string()).and_then(|html| {
            let path = output_path(input, args.out_dir.as_deref());
            fs::write(&path, html)
                .map(|_| path)
                .map_err(|e| e.to_string())
        });
        match written {
            Ok(path) => println!("{} -> {}", input.display(), path.display()),
            Err(e) => {
                eprintln!("Error inlining {}: {}", input.display(), e);
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}
