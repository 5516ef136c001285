use clap::Parser;
use fusionai::{
    logger::{self, LogLevel, LoggerConfig},
    ArtStyle, DressStyle, EncodedImage, FusionConfig, FusionSession, Mode, ProviderKind, Scene,
    Slot,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fusionai", version, about = "Fuse two portraits into one couple picture")]
struct Cli {
    /// Photo of the first person
    #[arg(required_unless_present = "list")]
    first: Option<PathBuf>,

    /// Photo of the second person
    #[arg(required_unless_present = "list")]
    second: Option<PathBuf>,

    /// realistic or artistic
    #[arg(long, default_value = "realistic")]
    mode: Mode,

    /// Scene used in realistic mode
    #[arg(long)]
    scene: Option<Scene>,

    /// Art style used in artistic mode
    #[arg(long)]
    style: Option<ArtStyle>,

    #[arg(long)]
    dress_style: Option<DressStyle>,

    /// Overrides FUSION_PROVIDER
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Output file stem; the extension follows the generated image type
    #[arg(short, long, default_value = "fusion")]
    output: String,

    /// Generate this many pictures, one after another
    #[arg(long, default_value_t = 1)]
    attempts: u32,

    /// Print the available modes, scenes, styles and dress styles
    #[arg(long)]
    list: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn print_catalogue() {
    println!("Modes:");
    for mode in Mode::ALL {
        println!("  {} ({})", mode, mode.label());
    }
    println!("{}", Mode::Realistic.selection_prompt());
    for scene in Scene::ALL {
        println!("  {}", scene);
    }
    println!("{}", Mode::Artistic.selection_prompt());
    for style in ArtStyle::ALL {
        println!("  {}", style);
    }
    println!("Choose a Dress Style:");
    for dress in DressStyle::ALL {
        println!("  {}", dress);
    }
}

fn output_path(stem: &str, attempt: u32, attempts: u32, artifact: &EncodedImage) -> PathBuf {
    if attempts > 1 {
        PathBuf::from(format!("{}-{}.{}", stem, attempt, artifact.extension()))
    } else {
        PathBuf::from(format!("{}.{}", stem, artifact.extension()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let logger_config = if cli.verbose {
        LoggerConfig::development()
    } else {
        LoggerConfig::default().with_level(LogLevel::Info)
    };
    logger::init_with_config(logger_config)?;

    if !dotenv_loaded {
        log::debug!("No .env file found, using system environment variables");
    }

    if cli.list {
        print_catalogue();
        return Ok(());
    }

    let mut config = FusionConfig::from_env()?;
    if let Some(provider) = cli.provider {
        config = config.with_provider(provider);
    }
    logger::log_config_info(&config);

    let service = fusionai::build_service(&config).await.map_err(|e| {
        log::error!("Failed to initialise generation service: {}", e);
        e
    })?;

    let mut session = FusionSession::new(service);
    for (slot, path) in [(Slot::First, &cli.first), (Slot::Second, &cli.second)] {
        if let Some(path) = path {
            session.set_image(slot, EncodedImage::from_file(path)?);
        }
    }

    session.set_mode(cli.mode);
    if let Some(scene) = cli.scene {
        session.select_scene(scene);
    }
    if let Some(style) = cli.style {
        session.select_style(style);
    }
    if let Some(dress_style) = cli.dress_style {
        session.select_dress_style(dress_style);
    }

    let options = session.selections().compose();
    log::info!(
        "🎨 {} / {} / {}",
        options.mode.label(),
        options.selection,
        options.dress_style
    );

    for attempt in 1..=cli.attempts.max(1) {
        log::info!("✨ Creating magic ({}/{})...", attempt, cli.attempts.max(1));

        let artifact = session.generate().await.map_err(|e| {
            log::error!("{}", e);
            e
        })?;

        let path = output_path(&cli.output, attempt, cli.attempts, &artifact);
        fs::write(&path, artifact.decode()?)?;
        log::info!("💾 Your fusion was saved to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_options() {
        let cli = Cli::try_parse_from([
            "fusionai",
            "a.png",
            "b.jpg",
            "--mode",
            "artistic",
            "--style",
            "pop-art",
            "--dress-style",
            "Western Wedding",
            "--provider",
            "gemini",
        ])
        .unwrap();

        assert_eq!(cli.mode, Mode::Artistic);
        assert_eq!(cli.style, Some(ArtStyle::PopArt));
        assert_eq!(cli.dress_style, Some(DressStyle::WesternWedding));
        assert_eq!(cli.provider, Some(ProviderKind::Gemini));
        assert_eq!(cli.attempts, 1);
    }

    #[test]
    fn test_cli_requires_both_images_unless_listing() {
        assert!(Cli::try_parse_from(["fusionai", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["fusionai", "--list"]).is_ok());
        assert!(Cli::try_parse_from(["fusionai", "a.png", "b.png", "--scene", "Moon"]).is_err());
    }

    #[test]
    fn test_output_path_numbering() {
        let artifact = EncodedImage::from_base64("image/jpeg", "AAAA").unwrap();
        assert_eq!(output_path("out", 1, 1, &artifact), PathBuf::from("out.jpg"));
        assert_eq!(output_path("out", 2, 3, &artifact), PathBuf::from("out-2.jpg"));
    }
}
