// ABOUTME: Command implementations for the applytrack CLI
// ABOUTME: Handles render, scan, lint, templates, init, market, and report commands

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::config::Config;
use crate::documents::{Document, LoadedTemplate, TemplateSource};
use crate::lint::Linter;
use crate::market::{store, MarketAnalyzer, MarketSnapshot};
use crate::output::formatter::OutputFormat;
use crate::output::writer::OutputDestination;
use crate::output::OutputHandler;
use crate::report;
use crate::template::{RenderMode, ScanReport, SyntaxChoice, TemplateContext, TemplateEngine};

/// Options shared by the render and report commands
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub syntax: SyntaxChoice,
    pub strict: bool,
    pub output: Option<PathBuf>,
}

/// Fill a template and write the result
pub async fn render_template(
    template: String,
    vars: Vec<String>,
    vars_file: Option<PathBuf>,
    options: RenderOptions,
    config: &Config,
) -> Result<()> {
    let loaded = load_template(&template).await?;

    let mut context = config.default_variables();
    if let Some(path) = vars_file {
        let file_vars = TemplateContext::load_file(&path)
            .await
            .with_context(|| format!("Failed to load variables from {}", path.display()))?;
        context.extend(file_vars);
    }
    context.extend(TemplateContext::from_pairs(&vars)?);
    info!("Rendering {} with {} variables", loaded.source, context.len());

    write_rendered(&loaded, &context, options, config).await
}

/// List the placeholders in a template
pub async fn scan_template(
    template: String,
    syntax: SyntaxChoice,
    format: OutputFormat,
) -> Result<()> {
    let loaded = load_template(&template).await?;
    let engine = TemplateEngine::new().with_syntax(choose_syntax(syntax, &loaded));

    let resolved = engine.syntax_for(&loaded.content);
    let report = ScanReport::new(&loaded.source, resolved, engine.scan(&loaded.content));
    info!(
        "Scanned {}: {} placeholders ({} distinct)",
        report.source, report.total, report.distinct
    );

    OutputHandler::stdout(format).write_scan(&report).await?;
    Ok(())
}

/// Run every lint check over a template
pub async fn lint_template(
    template: String,
    syntax: SyntaxChoice,
    strict: bool,
    format: OutputFormat,
) -> Result<()> {
    let loaded = load_template(&template).await?;
    let report = Linter::new()
        .with_syntax(choose_syntax(syntax, &loaded))
        .lint(&loaded.source, &loaded.content);

    OutputHandler::stdout(format).write_lint(&report).await?;

    if !report.is_clean() {
        anyhow::bail!(
            "Lint failed for {}: {} errors, {} warnings",
            report.source,
            report.errors(),
            report.warnings()
        );
    }
    if strict && !report.is_strictly_clean() {
        anyhow::bail!(
            "Lint failed for {} in strict mode: {} warnings",
            report.source,
            report.warnings()
        );
    }

    info!("Lint passed for {}", report.source);
    Ok(())
}

/// List the built-in documents
pub async fn list_templates() -> Result<()> {
    for document in Document::all() {
        println!(
            "{:<14} {:<9} {}",
            document.name(),
            document.syntax(),
            document.description()
        );
    }
    Ok(())
}

/// Print a built-in document
pub async fn show_template(name: String) -> Result<()> {
    let document = find_document(&name)?;
    OutputHandler::default().write_text(document.content()).await?;
    Ok(())
}

/// Write a built-in document to `<output_dir>/<name>.md`
pub async fn init_document(name: String, output_dir: PathBuf, document: String) -> Result<()> {
    let document = find_document(&document)?;
    info!(
        "Initializing '{}' from {} in {}",
        name,
        document,
        output_dir.display()
    );

    let file_name = if name.ends_with(".md") {
        name
    } else {
        format!("{}.md", name)
    };
    let target = output_dir.join(file_name);

    if target.exists() {
        anyhow::bail!("File already exists: {}", target.display());
    }

    OutputHandler::new(OutputFormat::Text, OutputDestination::file(&target))
        .write_text(document.content())
        .await
        .with_context(|| format!("Failed to create {}", target.display()))?;

    println!("✓ Created {} from {}", target.display(), document);
    Ok(())
}

/// Compute the market aggregates and persist them as JSON
pub async fn run_market(
    tracker: PathBuf,
    output_dir: Option<PathBuf>,
    as_of: Option<NaiveDate>,
    half_life: Option<f64>,
    config: &Config,
) -> Result<()> {
    let half_life = half_life.unwrap_or(config.market.half_life_days);
    let snapshot = analyze(&tracker, as_of, half_life).await?;

    let output_dir = output_dir
        .or_else(|| config.default_output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let written = store::write_snapshot(&snapshot, &output_dir)
        .await
        .with_context(|| format!("Failed to write aggregates to {}", output_dir.display()))?;

    println!(
        "Analyzed {} applications as of {}: {} configs, {} clusters, {} ATS systems; wrote {} files to {}",
        snapshot.total_applications,
        snapshot.as_of,
        snapshot.configs.len(),
        snapshot.clusters.len(),
        snapshot.ats_patterns.len(),
        written.len(),
        output_dir.display()
    );
    Ok(())
}

/// Render the weekly report from tracker aggregates
pub async fn run_report(
    tracker: PathBuf,
    template: String,
    vars: Vec<String>,
    as_of: Option<NaiveDate>,
    options: RenderOptions,
    config: &Config,
) -> Result<()> {
    let snapshot = analyze(&tracker, as_of, config.market.half_life_days).await?;
    let loaded = load_template(&template).await?;

    let mut context = config.default_variables();
    context.extend(report::variables(&snapshot, &config.market.report_options()));
    context.extend(TemplateContext::from_pairs(&vars)?);

    write_rendered(&loaded, &context, options, config).await
}

async fn analyze(tracker: &Path, as_of: Option<NaiveDate>, half_life: f64) -> Result<MarketSnapshot> {
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let analyzer = MarketAnalyzer::new(as_of, half_life)?;

    analyzer
        .analyze_file(tracker)
        .await
        .with_context(|| format!("Failed to analyze tracker {}", tracker.display()))
}

async fn load_template(template: &str) -> Result<LoadedTemplate> {
    TemplateSource::parse(template)?.load().await
}

async fn write_rendered(
    loaded: &LoadedTemplate,
    context: &TemplateContext,
    options: RenderOptions,
    config: &Config,
) -> Result<()> {
    let mode = if options.strict || config.strict {
        RenderMode::Strict
    } else {
        RenderMode::Lenient
    };
    let engine = TemplateEngine::new()
        .with_syntax(choose_syntax(options.syntax, loaded))
        .with_mode(mode);

    let rendered = engine
        .render(&loaded.content, context)
        .with_context(|| format!("Failed to render {}", loaded.source))?;

    if !rendered.is_complete() {
        warn!(
            "{} placeholders left unfilled in {}: {}",
            rendered.unresolved.len(),
            loaded.source,
            rendered.unresolved_names().join(", ")
        );
    }
    info!(
        "Rendered {} ({} substitutions)",
        loaded.source, rendered.substituted
    );

    OutputHandler::new(
        OutputFormat::Text,
        OutputDestination::from_option(options.output),
    )
    .write_text(&rendered.text)
    .await?;
    Ok(())
}

/// An explicit `--syntax` wins; otherwise the template's own syntax applies
fn choose_syntax(requested: SyntaxChoice, loaded: &LoadedTemplate) -> SyntaxChoice {
    match requested {
        SyntaxChoice::Auto => loaded.syntax,
        explicit => explicit,
    }
}

fn find_document(name: &str) -> Result<Document> {
    Document::from_name(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown document '{}'. Available: {}",
            name,
            Document::available()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn options(output: PathBuf) -> RenderOptions {
        RenderOptions {
            syntax: SyntaxChoice::Auto,
            strict: false,
            output: Some(output),
        }
    }

    #[tokio::test]
    async fn test_render_merges_variable_sources() {
        let temp_dir = tempdir().unwrap();
        let template = temp_dir.path().join("note.md");
        let vars_file = temp_dir.path().join("vars.yaml");
        let output = temp_dir.path().join("out.md");
        std::fs::write(&template, "{{ a }} {{ b }} {{ c }}\n").unwrap();
        std::fs::write(&vars_file, "b: from-file\nc: from-file\n").unwrap();

        let mut config = Config::default();
        config.variables.insert("a".into(), "from-config".into());
        config.variables.insert("b".into(), "from-config".into());

        render_template(
            template.display().to_string(),
            vec!["c=from-flag".to_string()],
            Some(vars_file),
            options(output.clone()),
            &config,
        )
        .await
        .unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text, "from-config from-file from-flag\n");
    }

    #[tokio::test]
    async fn test_config_strict_applies_to_render() {
        let temp_dir = tempdir().unwrap();
        let output = temp_dir.path().join("out.md");
        let config = Config {
            strict: true,
            ..Config::default()
        };

        let result = render_template(
            "builtin:resume".to_string(),
            vec![],
            None,
            options(output.clone()),
            &config,
        )
        .await;

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().to_path_buf();

        init_document("cv".into(), dir.clone(), "resume".into())
            .await
            .unwrap();
        let created = std::fs::read_to_string(dir.join("cv.md")).unwrap();
        assert_eq!(created, Document::Resume.content());

        let again = init_document("cv".into(), dir, "resume".into()).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn test_unknown_document() {
        let temp_dir = tempdir().unwrap();
        let result = init_document(
            "letter".into(),
            temp_dir.path().to_path_buf(),
            "cover-letter".into(),
        )
        .await;

        let message = result.unwrap_err().to_string();
        assert!(message.contains("weekly-report, resume"));
    }

    #[test]
    fn test_choose_syntax() {
        let loaded = LoadedTemplate {
            source: "builtin:resume".into(),
            content: String::new(),
            syntax: SyntaxChoice::Bracket,
        };
        assert_eq!(choose_syntax(SyntaxChoice::Auto, &loaded), SyntaxChoice::Bracket);
        assert_eq!(
            choose_syntax(SyntaxChoice::Mustache, &loaded),
            SyntaxChoice::Mustache
        );
    }
}
