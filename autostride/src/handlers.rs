use anyhow::{Context, Result, bail};
use autostride_core::report::{ReportData, ReportFormat, ReportMetadata, generate_report, save_report};
use autostride_core::{
    AutoStrideConfig, ClassMap, ComponentKind, GraphBuilder, KnowledgeBase, Severity,
    StrideAnalyzer,
};
use autostride_detection::DetectionSet;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Load the configuration file if one was given, otherwise use defaults.
pub fn load_config(path: Option<&str>) -> Result<AutoStrideConfig> {
    let Some(path) = path else {
        return Ok(AutoStrideConfig::default());
    };

    let expanded = shellexpand::tilde(path);
    let config = AutoStrideConfig::from_path(Path::new(expanded.as_ref()))
        .with_context(|| format!("Could not load configuration from {}", path))?;
    Ok(config)
}

/// Apply command-line overrides on top of the loaded configuration.
pub fn apply_overrides(
    mut config: AutoStrideConfig,
    conf_threshold: Option<f64>,
) -> Result<AutoStrideConfig> {
    if let Some(threshold) = conf_threshold {
        config.builder = config.builder.with_min_confidence(threshold);
        config
            .validate()
            .context("Invalid --conf-threshold")?;
    }
    Ok(config)
}

/// Load one detection file, build its graph and run the threat analysis.
pub fn analyze_file(
    path: &Path,
    config: &AutoStrideConfig,
    include_graph: bool,
) -> Result<ReportData> {
    let started = Instant::now();

    let detections = DetectionSet::from_path(path)
        .with_context(|| format!("Could not load detections from {}", path.display()))?;

    let graph = GraphBuilder::new(config.builder.clone()).build(&detections);
    let analysis = StrideAnalyzer::new(config.analyzer.clone()).analyze(&graph);

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    debug!("Analyzed {} in {:.2} ms", path.display(), elapsed_ms);

    let metadata = ReportMetadata::new(
        detections.source.clone(),
        elapsed_ms,
        detections.len(),
        config.builder.min_confidence,
    );

    Ok(ReportData::new(metadata, &graph, analysis, include_graph))
}

/// Where to write the report for `input`. A batch writes one file per input,
/// named after the input's stem.
pub fn output_path_for(base: &Path, input: &Path, format: ReportFormat, batch: bool) -> PathBuf {
    if !batch {
        return base.to_path_buf();
    }

    let base_stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let input_stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let extension = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| format.extension().to_string());

    base.with_file_name(format!("{}_{}.{}", base_stem, input_stem, extension))
}

/// One line per report: source and threat counts by severity.
pub fn summary_line(data: &ReportData) -> String {
    let summary = &data.analysis.summary;
    let source = data.metadata.source.as_deref().unwrap_or("(unnamed)");

    format!(
        "{} {}: {} threats ({} critical, {} high, {} medium, {} low)",
        "✓".green().bold(),
        source.bright_white(),
        summary.total_threats,
        summary.severity_count(Severity::Critical).to_string().red().bold(),
        summary.severity_count(Severity::High).to_string().red(),
        summary.severity_count(Severity::Medium).to_string().yellow(),
        summary.severity_count(Severity::Low).to_string().blue(),
    )
}

pub fn handle_analyze(args: &ArgMatches) -> Result<()> {
    let inputs: Vec<PathBuf> = args
        .get_many::<PathBuf>("input")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let output = args.get_one::<PathBuf>("output");
    let include_graph = args.get_flag("include-graph");
    let format_name = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let Some(format) = ReportFormat::from_str(format_name) else {
        bail!("Unknown report format '{}'", format_name);
    };

    let config = load_config(args.get_one::<String>("config").map(String::as_str))?;
    let config = apply_overrides(config, args.get_one::<f64>("conf-threshold").copied())?;

    let batch = inputs.len() > 1;
    let pb = if batch {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("█▓░"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut failures = 0;
    for input in &inputs {
        pb.set_message(input.display().to_string());

        match render_one(input, &config, format, include_graph, output, batch, &pb) {
            Ok(line) => pb.suspend(|| eprintln!("{}", line)),
            Err(e) => {
                failures += 1;
                warn!("Skipping {}: {:#}", input.display(), e);
                pb.suspend(|| eprintln!("{} {:#}", "✗".red().bold(), e));
            }
        }

        pb.inc(1);
    }
    pb.finish_and_clear();

    if failures == inputs.len() {
        bail!("No input could be analyzed");
    }
    Ok(())
}

fn render_one(
    input: &Path,
    config: &AutoStrideConfig,
    format: ReportFormat,
    include_graph: bool,
    output: Option<&PathBuf>,
    batch: bool,
    pb: &ProgressBar,
) -> Result<String> {
    let data = analyze_file(input, config, include_graph)?;
    let report = generate_report(&data, format).context("Failed to render report")?;

    match output {
        Some(base) => {
            let expanded = shellexpand::tilde(&base.to_string_lossy()).into_owned();
            let path = output_path_for(Path::new(&expanded), input, format, batch);
            save_report(&report, &path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            Ok(format!("{} -> {}", summary_line(&data), path.display()))
        }
        None => {
            pb.suspend(|| print!("{}", report));
            Ok(summary_line(&data))
        }
    }
}

pub fn render_classes(classes: &ClassMap) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<8}{}\n", "CLASS", "KIND"));
    for (class_id, kind) in &classes.components {
        out.push_str(&format!("{:<8}{}\n", class_id, kind));
    }
    out.push_str(&format!("{:<8}{}\n", classes.arrow_class, "(flow arrow)"));
    out
}

pub fn handle_classes(args: &ArgMatches) -> Result<()> {
    let config = load_config(args.get_one::<String>("config").map(String::as_str))?;
    print!("{}", render_classes(&config.builder.classes));
    Ok(())
}

pub fn render_rules(knowledge_base: &KnowledgeBase, kind: Option<ComponentKind>) -> String {
    let mut out = String::new();

    for current in knowledge_base.kinds().filter(|k| kind.is_none_or(|wanted| wanted == *k)) {
        out.push_str(&format!("{}\n", current.display_name().bold()));
        for rule in knowledge_base.rules_for(current) {
            out.push_str(&format!(
                "  {:<10}{:<24}{}\n",
                rule.severity.to_string(),
                rule.category.to_string(),
                rule.description
            ));
        }
        out.push('\n');
    }

    if out.is_empty() {
        out.push_str("No rules defined\n");
    }
    out
}

pub fn handle_rules(args: &ArgMatches) -> Result<()> {
    let config = load_config(args.get_one::<String>("config").map(String::as_str))?;
    let kind = match args.get_one::<String>("kind") {
        Some(name) => match ComponentKind::from_str(name) {
            Some(kind) => Some(kind),
            None => bail!("Unknown component kind '{}'", name),
        },
        None => None,
    };

    print!("{}", render_rules(&config.analyzer.knowledge_base, kind));
    Ok(())
}
