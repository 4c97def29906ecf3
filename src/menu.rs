// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Headless menu navigation.
//!
//! A [`Navigator`] walks a tree of [`Menu`]s with up/down/select/back input and
//! tracks which slice of the current menu is visible. Rendering and input
//! polling belong to the host.

use core::fmt;

use tracing::{debug, span, Level, Span};

/// Number of items visible at once.
pub const VIEWPORT_ROWS: usize = 27;

/// Labels longer than this are cut off when displayed.
pub const LABEL_WIDTH: usize = 38;

/// What selecting an item does besides navigating.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MenuAction {
    #[default]
    None,
    /// Close the whole menu.
    Exit,
    /// A command for the host to run.
    Command(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
    pub child: Option<Menu>,
}

impl MenuItem {
    /// An item that finishes the menu when selected.
    pub fn new(label: &str) -> MenuItem {
        MenuItem {
            label: label.to_string(),
            action: MenuAction::None,
            child: None,
        }
    }

    pub fn with_action(mut self, action: MenuAction) -> MenuItem {
        self.action = action;
        self
    }

    pub fn with_child(mut self, child: Menu) -> MenuItem {
        self.child = Some(child);
        self
    }
}

/// A titled list of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub title: String,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(title: &str, items: Vec<MenuItem>) -> Menu {
        Menu {
            title: title.to_string(),
            items,
        }
    }

    /// A flat menu of plain items, one per label.
    pub fn from_labels<S: AsRef<str>>(title: &str, labels: &[S]) -> Menu {
        Menu::new(
            title,
            labels.iter().map(|l| MenuItem::new(l.as_ref())).collect(),
        )
    }
}

/// The outcome of a select or back input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The current menu has no items.
    Nothing,
    /// Moved into the item's sub-menu. The item's action still needs running.
    Entered(MenuAction),
    /// Moved back to the parent menu.
    Returned,
    /// Finished on the item at `index` of the current menu.
    Chosen { index: usize, action: MenuAction },
    /// The item asked to close the menu.
    Exit,
    /// Backed out of the root menu.
    Cancelled,
}

impl Selection {
    /// Returns true if the menu is closed after this selection.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            Selection::Chosen { .. } | Selection::Exit | Selection::Cancelled
        )
    }
}

/// One visible row of the current menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow<'a> {
    pub index: usize,
    pub label: &'a str,
    pub selected: bool,
}

/// Tracks the cursor and scroll window while walking a menu tree.
pub struct Navigator<'a> {
    root: &'a Menu,
    /// Item indices leading from the root to the current menu.
    path: Vec<usize>,
    /// Cursor within the current menu.
    position: usize,
    /// First visible item.
    scroll: usize,
    span: Span,
}

impl<'a> Navigator<'a> {
    pub fn new(root: &'a Menu) -> Navigator<'a> {
        Navigator {
            root,
            path: Vec::new(),
            position: 0,
            scroll: 0,
            span: span!(Level::DEBUG, "menu"),
        }
    }

    /// The menu the cursor is in.
    pub fn current(&self) -> &'a Menu {
        let mut menu = self.root;
        for index in self.path.iter() {
            // Path entries always point at items with a child.
            if let Some(child) = menu.items.get(*index).and_then(|i| i.child.as_ref()) {
                menu = child;
            }
        }
        menu
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Index of the first visible item.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// How many sub-menus deep the cursor is.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Moves the cursor up, wrapping from the first item to the last.
    pub fn up(&mut self) {
        let count = self.current().items.len();
        if count == 0 {
            return;
        }

        if self.position == 0 {
            self.position = count - 1;
            self.scroll = count.saturating_sub(VIEWPORT_ROWS);
        } else {
            self.position -= 1;
            if self.position < self.scroll {
                self.scroll -= 1;
            }
        }
    }

    /// Moves the cursor down, wrapping from the last item to the first.
    pub fn down(&mut self) {
        let count = self.current().items.len();
        if count == 0 {
            return;
        }

        self.position += 1;
        if self.position >= count {
            self.position = 0;
            self.scroll = 0;
        } else if self.position >= self.scroll + VIEWPORT_ROWS {
            self.scroll += 1;
        }
    }

    /// Selects the item under the cursor.
    pub fn select(&mut self) -> Selection {
        let _enter = self.span.enter();
        let menu = self.current();
        let Some(item) = menu.items.get(self.position) else {
            return Selection::Nothing;
        };

        if item.action == MenuAction::Exit {
            debug!(menu = menu.title, item = item.label, "Menu exited");
            return Selection::Exit;
        }

        if let Some(child) = item.child.as_ref() {
            debug!(menu = menu.title, child = child.title, "Entering sub-menu");
            self.path.push(self.position);
            self.position = 0;
            self.scroll = 0;
            return Selection::Entered(item.action.clone());
        }

        debug!(menu = menu.title, item = item.label, "Menu item chosen");
        Selection::Chosen {
            index: self.position,
            action: item.action.clone(),
        }
    }

    /// Goes back to the parent menu, or cancels at the root.
    pub fn back(&mut self) -> Selection {
        if self.path.pop().is_some() {
            self.reset_cursor();
            Selection::Returned
        } else {
            Selection::Cancelled
        }
    }

    fn reset_cursor(&mut self) {
        self.position = 0;
        self.scroll = 0;
    }

    /// The rows currently in view.
    pub fn visible_rows(&self) -> Vec<MenuRow<'a>> {
        let items = &self.current().items;
        let end = items.len().min(self.scroll + VIEWPORT_ROWS);
        (self.scroll..end)
            .map(|index| {
                let label = &items[index].label;
                let cut = label
                    .char_indices()
                    .nth(LABEL_WIDTH)
                    .map_or(label.len(), |(i, _)| i);
                MenuRow {
                    index,
                    label: &label[..cut],
                    selected: index == self.position,
                }
            })
            .collect()
    }
}

impl fmt::Display for Navigator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.current().title)?;
        for row in self.visible_rows() {
            let marker = if row.selected { '>' } else { ' ' };
            writeln!(f, "{}{}", marker, row.label)?;
        }
        Ok(())
    }
}
