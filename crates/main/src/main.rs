use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use flashcard_pdf::builder::FlashcardBuilder;
use flashcard_pdf::deckfile;
use flashcard_pdf::fonts::FontTable;
use flashcard_pdf::layout::LayoutConfig;
use log::info;

/// Renders duplex flashcard sheets from the command line.
///
/// Fonts are looked up in `FLASHCARDS_FONTS_DIR`, then `assets/fonts`, then the system DejaVu
/// Sans directories, unless `--fonts` names a directory explicitly.  Set `RUST_LOG=debug` to see
/// the layout decisions.
#[derive(Parser)]
#[command(author, version, about = "Duplex flashcard PDF generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a tab-separated deck file.
    Render(RenderArgs),

    /// Render the bundled Latin vocabulary deck.
    Demo {
        /// Output file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Deck file: `original<TAB>translation[<TAB>extra[<TAB>index]]` per line.
    deck: PathBuf,

    /// Output file.
    #[arg(short, long, default_value = "flashcards.pdf")]
    output: PathBuf,

    /// Number of cards in every row.
    #[arg(long)]
    cards_per_row: Option<usize>,

    /// Card height in millimetres.
    #[arg(long, value_name = "MM")]
    card_height: Option<f64>,

    /// Paper width in millimetres.
    #[arg(long, value_name = "MM", requires = "page_height")]
    page_width: Option<f64>,

    /// Paper height in millimetres.
    #[arg(long, value_name = "MM", requires = "page_width")]
    page_height: Option<f64>,

    #[arg(long, value_name = "MM")]
    margin_top: Option<f64>,

    #[arg(long, value_name = "MM")]
    margin_bottom: Option<f64>,

    #[arg(long, value_name = "MM")]
    margin_left: Option<f64>,

    #[arg(long, value_name = "MM")]
    margin_right: Option<f64>,

    /// Directory holding Roboto or DejaVu Sans font files.
    #[arg(long, value_name = "DIR")]
    fonts: Option<PathBuf>,

    /// Add an outline entry for every sheet side.
    #[arg(long)]
    bookmarks: bool,
}

impl RenderArgs {
    fn layout(&self) -> LayoutConfig {
        let mut config = LayoutConfig::default();
        if let Some(count) = self.cards_per_row {
            config.cards_per_row = count;
        }
        if let Some(height) = self.card_height {
            config.card_height = height;
        }
        if let (Some(width), Some(height)) = (self.page_width, self.page_height) {
            config.page_width = width;
            config.page_height = height;
        }
        let margins = &mut config.margins;
        for (value, field) in [
            (self.margin_top, &mut margins.top),
            (self.margin_bottom, &mut margins.bottom),
            (self.margin_left, &mut margins.left),
            (self.margin_right, &mut margins.right),
        ] {
            if let Some(value) = value {
                *field = value;
            }
        }
        config
    }
}

fn render(args: RenderArgs) -> Result<(), Box<dyn Error>> {
    let deck = deckfile::load_deck(&args.deck)?;
    info!("read {} cards from {}", deck.len(), args.deck.display());

    let mut builder = FlashcardBuilder::from_deck(deck)
        .with_layout(args.layout())
        .with_output(&args.output);
    if let Some(directory) = &args.fonts {
        builder = builder.with_fonts(FontTable::from_any_directory(directory)?);
    }

    let path = if args.bookmarks {
        generate_with_bookmarks(&builder)?
    } else {
        builder.generate()?
    };
    println!("Generated {}", path.display());
    Ok(())
}

#[cfg(feature = "bookmarks")]
fn generate_with_bookmarks(builder: &FlashcardBuilder) -> Result<PathBuf, Box<dyn Error>> {
    Ok(builder.generate_with_bookmarks()?)
}

#[cfg(not(feature = "bookmarks"))]
fn generate_with_bookmarks(_builder: &FlashcardBuilder) -> Result<PathBuf, Box<dyn Error>> {
    Err("--bookmarks requires building with `--features bookmarks`".into())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render(args) => render(args),
        Commands::Demo { output } => flashcard_pdf::demos::run_latin(output.as_deref())
            .map(|path| println!("Generated {}", path.display()))
            .map_err(Into::into),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
