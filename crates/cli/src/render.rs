//! Plain-text rendering of menus and composed pages.

use wardview_core::compose::{Affordance, BannerLevel, PageStatus};
use wardview_core::{MenuEntry, PageViewModel, Renderer};

/// Accumulates the dashboard as text. Printed by the caller once the command
/// is done.
#[derive(Default)]
pub struct TextRenderer {
    out: String,
}

impl TextRenderer {
    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }
}

impl Renderer for TextRenderer {
    fn render_menu(&mut self, menu: &[MenuEntry], active: Option<&str>) {
        if menu.is_empty() {
            self.line("(no menu for this role)");
            return;
        }
        for entry in menu {
            let marker = if active == Some(entry.id) { '>' } else { ' ' };
            self.line(format!("{marker} {:<22} {}", entry.id, entry.label));
        }
        self.line("");
    }

    fn render_page(&mut self, view: &PageViewModel) {
        self.line(format!("== {} ==", view.title));
        match view.status {
            PageStatus::Content => {}
            PageStatus::NotImplemented => self.line("[not implemented]"),
            PageStatus::Restricted => self.line("[restricted]"),
        }

        for banner in &view.banner_slots {
            let tag = match banner.level {
                BannerLevel::Info => "info",
                BannerLevel::Warning => "warning",
            };
            self.line(format!("[{tag}] {}", banner.text));
        }

        if !view.actions.is_empty() {
            self.line(format!("actions: {}", affordances(&view.actions)));
        }

        if !view.columns.is_empty() {
            self.line(view.columns.join(" | "));
            for row in &view.summary_rows {
                let mut line = row.cells.join(" | ");
                if !row.actions.is_empty() {
                    line.push_str(&format!("  [{}]", affordances(&row.actions)));
                }
                self.line(line);
            }
        }

        for section in &view.detail_sections {
            self.line("");
            self.line(format!("-- {} --", section.heading));
            for line in &section.lines {
                self.line(format!("  {line}"));
            }
        }
    }
}

fn affordances(actions: &[Affordance]) -> String {
    actions
        .iter()
        .map(|a| match a {
            Affordance::Add => "add",
            Affordance::Edit => "edit",
            Affordance::Delete => "delete",
        })
        .collect::<Vec<_>>()
        .join(", ")
}
