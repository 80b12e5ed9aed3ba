//! Koala text CLI
//!
//! Plain-text extraction, range length and find-in-page over a JSON document
//! fixture (see `koala_dom::DomTree::from_json` for the format).
//!
//! - koala text page.json               # Print the document's text
//! - koala length page.json --id intro  # Count characters of one element
//! - koala find page.json world --all   # List every match

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use koala_common::warning::clear_warnings;
use koala_dom::{DomTree, Range};
use koala_editing::{
    FindOptions, TextContext, TextFinder, TextIteratorBehavior, plain_text, plain_text_with_max_length,
    range_length,
};
use koala_layout::{LayoutOptions, RenderTree};
use owo_colors::OwoColorize;

/// Characters of context shown on each side of a match.
const MATCH_CONTEXT: usize = 24;

/// Koala text: read what a document says, and search it
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the text of a document
    koala text page.json

    # Text of one element, wrapped at 320px, first 200 characters
    koala text page.json --id main --width 320 --max-chars 200

    # Include text controls and shadow trees
    koala text page.json --enters-text-controls --enters-author-shadow-roots

    # Case-insensitive search for every match
    koala find page.json hello -i --all

    # Step through matches backwards, wrapping at the start
    koala find page.json hello --backwards --wrap-around --repeat 3
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the plain text of the document or of one element
    Text {
        #[command(flatten)]
        document: DocumentArgs,

        #[command(flatten)]
        behavior: BehaviorArgs,

        /// Stop after this many characters
        #[arg(long, value_name = "N")]
        max_chars: Option<usize>,
    },
    /// Print the number of characters in the document or one element
    Length {
        #[command(flatten)]
        document: DocumentArgs,

        /// Count every visible position, as selection preservation does
        #[arg(long)]
        for_selection_preservation: bool,
    },
    /// Search the document's text
    Find {
        #[command(flatten)]
        document: DocumentArgs,

        /// Text to look for
        target: String,

        /// Ignore case, accents and kana variants
        #[arg(short = 'i', long)]
        case_insensitive: bool,

        /// Only match at the start of words
        #[arg(short = 'w', long)]
        at_word_starts: bool,

        /// With --at-word-starts, capitals inside words also start words
        #[arg(long)]
        medial_capitals: bool,

        /// Search from the end
        #[arg(short = 'b', long)]
        backwards: bool,

        /// Continue from the other end when running off the document
        #[arg(long)]
        wrap_around: bool,

        /// List every match instead of the first
        #[arg(long, conflicts_with_all = ["backwards", "repeat"])]
        all: bool,

        /// Number of find-next steps to take
        #[arg(long, default_value = "1")]
        repeat: usize,
    },
}

#[derive(Args, Debug)]
struct DocumentArgs {
    /// JSON document fixture
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Restrict to the contents of the element with this id
    #[arg(long, value_name = "ID")]
    id: Option<String>,

    /// Available line width in px (default: no wrapping)
    #[arg(long, value_name = "PX")]
    width: Option<f32>,
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
struct BehaviorArgs {
    /// Descend into text controls and print their values
    #[arg(long)]
    enters_text_controls: bool,

    /// Descend into author shadow trees
    #[arg(long)]
    enters_author_shadow_roots: bool,

    /// Emit a character for every visible position
    #[arg(long)]
    emits_characters_between_all_visible_positions: bool,

    /// Print text as written, before text-transform
    #[arg(long)]
    emits_original_text: bool,

    /// Include text hidden with visibility or clipping
    #[arg(long)]
    ignores_style_visibility: bool,

    /// Stop at the first form control
    #[arg(long)]
    stops_on_form_controls: bool,

    /// Print the alt text of images
    #[arg(long)]
    emits_image_alt_text: bool,
}

impl BehaviorArgs {
    fn behavior(&self) -> TextIteratorBehavior {
        let mut behavior = TextIteratorBehavior::empty();
        behavior.set(TextIteratorBehavior::ENTERS_TEXT_CONTROLS, self.enters_text_controls);
        behavior.set(TextIteratorBehavior::ENTERS_AUTHOR_SHADOW_ROOTS, self.enters_author_shadow_roots);
        behavior.set(
            TextIteratorBehavior::EMITS_CHARACTERS_BETWEEN_ALL_VISIBLE_POSITIONS,
            self.emits_characters_between_all_visible_positions,
        );
        behavior.set(TextIteratorBehavior::EMITS_ORIGINAL_TEXT, self.emits_original_text);
        behavior.set(TextIteratorBehavior::IGNORES_STYLE_VISIBILITY, self.ignores_style_visibility);
        behavior.set(TextIteratorBehavior::STOPS_ON_FORM_CONTROLS, self.stops_on_form_controls);
        behavior.set(TextIteratorBehavior::EMITS_IMAGE_ALT_TEXT, self.emits_image_alt_text);
        behavior
    }
}

/// A loaded document and its layout.
struct Loaded {
    dom: DomTree,
    layout: RenderTree,
}

impl Loaded {
    fn ctx(&self) -> TextContext<'_> {
        TextContext::new(&self.dom, &self.layout)
    }

    /// The contents of the element with `id`, or of the whole document.
    fn scope(&self, id: Option<&str>) -> anyhow::Result<Range> {
        let node = match id {
            Some(id) => self
                .dom
                .get_element_by_id(id)
                .with_context(|| format!("no element with id '{id}'"))?,
            None => self.dom.root(),
        };
        Ok(Range::select_node_contents(&self.dom, node))
    }
}

fn load(args: &DocumentArgs) -> anyhow::Result<Loaded> {
    clear_warnings();
    let json = fs::read_to_string(&args.path).with_context(|| format!("reading {}", args.path.display()))?;
    let dom = DomTree::from_json(&json).with_context(|| format!("loading {}", args.path.display()))?;
    let options = LayoutOptions {
        available_width: args.width,
        ..LayoutOptions::default()
    };
    let layout = RenderTree::build(&dom, &options);
    Ok(Loaded { dom, layout })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Text {
            document,
            behavior,
            max_chars,
        } => {
            let loaded = load(&document)?;
            let scope = loaded.scope(document.id.as_deref())?;
            let text = match max_chars {
                Some(max_chars) => plain_text_with_max_length(loaded.ctx(), &scope, max_chars),
                None => plain_text(loaded.ctx(), &scope, behavior.behavior()),
            };
            println!("{text}");
        }
        Command::Length {
            document,
            for_selection_preservation,
        } => {
            let loaded = load(&document)?;
            let scope = loaded.scope(document.id.as_deref())?;
            println!("{}", range_length(loaded.ctx(), &scope, for_selection_preservation));
        }
        Command::Find {
            document,
            target,
            case_insensitive,
            at_word_starts,
            medial_capitals,
            backwards,
            wrap_around,
            all,
            repeat,
        } => {
            let loaded = load(&document)?;
            let scope = loaded.scope(document.id.as_deref())?;
            let mut options = FindOptions::empty();
            options.set(FindOptions::CASE_INSENSITIVE, case_insensitive);
            options.set(FindOptions::AT_WORD_STARTS, at_word_starts);
            options.set(FindOptions::TREAT_MEDIAL_CAPITAL_AS_WORD_START, medial_capitals);
            options.set(FindOptions::BACKWARDS, backwards);
            options.set(FindOptions::WRAP_AROUND, wrap_around);

            let finder = TextFinder::new(loaded.ctx(), scope);
            let printer = MatchPrinter::new(loaded.ctx(), scope);
            if all {
                let matches = finder.find_all(&target, options)?;
                for found in &matches {
                    printer.print(found);
                }
                println!("{} {}", matches.len().bold(), if matches.len() == 1 { "match" } else { "matches" });
            } else {
                let mut active = None;
                for _ in 0..repeat {
                    active = finder.find_next(active.as_ref(), &target, options)?;
                    match &active {
                        Some(found) => printer.print(found),
                        None => {
                            println!("{}", "no match".dimmed());
                            break;
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Prints matches with their character offset and surrounding text.
struct MatchPrinter<'a> {
    ctx: TextContext<'a>,
    scope: Range,
    text: Vec<char>,
}

impl<'a> MatchPrinter<'a> {
    /// Offsets are measured in the same text the search runs over.
    const BEHAVIOR: TextIteratorBehavior =
        TextIteratorBehavior::ENTERS_TEXT_CONTROLS.union(TextIteratorBehavior::ENTERS_AUTHOR_SHADOW_ROOTS);

    fn new(ctx: TextContext<'a>, scope: Range) -> Self {
        let text = plain_text(ctx, &scope, Self::BEHAVIOR).chars().collect();
        MatchPrinter { ctx, scope, text }
    }

    fn print(&self, found: &Range) {
        let before = Range {
            start: self.scope.start,
            end: found.start,
        };
        let offset = plain_text(self.ctx, &before, Self::BEHAVIOR).chars().count();
        let length = plain_text(self.ctx, found, Self::BEHAVIOR).chars().count();
        let end = (offset + length).min(self.text.len());
        let offset = offset.min(end);

        let context_start = offset.saturating_sub(MATCH_CONTEXT);
        let context_end = (end + MATCH_CONTEXT).min(self.text.len());
        let show = |chars: &[char]| chars.iter().map(|&c| if c == '\n' { '⏎' } else { c }).collect::<String>();

        println!(
            "{:>6}  {}{}{}",
            offset.yellow(),
            show(&self.text[context_start..offset]).dimmed(),
            show(&self.text[offset..end]).black().on_yellow(),
            show(&self.text[end..context_end]).dimmed(),
        );
    }
}
