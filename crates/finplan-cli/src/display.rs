use bat::WrappingMode;
use clap::ValueEnum;
use console::{style, Term};
use finplan::render::console::{Panel, PanelBody};
use finplan::render::fence::CodeBlock;
use tracing::warn;

const PANEL_WIDTH: usize = 80;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    fn text_theme(self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }

    fn code_theme(self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "Monokai Extended",
        }
    }
}

pub fn print_panel(panel: &Panel, theme: Theme) {
    let columns = terminal_width();
    let width = if panel.expand {
        columns
    } else {
        columns.min(PANEL_WIDTH)
    };

    println!("{}", style(title_rule(&panel.title, width)).bold().blue());
    match &panel.body {
        PanelBody::Text(text) => print_markdown(text, theme),
        PanelBody::Code(block) => print_code(block, theme),
    }
    println!("{}", style("─".repeat(width)).dim());
    println!();
}

pub fn print_error(message: &str) {
    println!("{} {}", style("✗ Processing Error:").red().bold(), message);
}

fn terminal_width() -> usize {
    let (_, columns) = Term::stdout().size();
    usize::from(columns).max(PANEL_WIDTH / 2)
}

/// `─── title ─────` padded with rule characters to `width`.
fn title_rule(title: &str, width: usize) -> String {
    let head = format!("─── {} ", title);
    let used = head.chars().count();
    format!("{}{}", head, "─".repeat(width.saturating_sub(used)))
}

fn print_markdown(content: &str, theme: Theme) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme.text_theme())
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    if let Err(e) = printed {
        warn!("Falling back to plain output: {}", e);
        println!("{}", content);
    }
}

fn print_code(block: &CodeBlock, theme: Theme) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(block.code.as_bytes()))
        .theme(theme.code_theme())
        .language(&block.language)
        .line_numbers(true)
        .wrapping_mode(WrappingMode::Character)
        .print();
    if let Err(e) = printed {
        warn!("Could not highlight {} code: {}", block.language, e);
        println!("{}", block.code);
    }
}
