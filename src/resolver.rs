use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use rusqlite::Connection;

use crate::catalog::CategoryCatalog;
use crate::error::Result;
use crate::models::Direction;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveAction {
    AppendExisting,
    CreateNew,
}

/// Interactive seam for the resolver. The CLI uses the dialoguer-backed
/// implementation; tests script the answers.
pub trait Prompter {
    fn pick_action(&mut self, description: &str, direction: Direction) -> ResolveAction;
    fn pick_existing(&mut self, options: &[String]) -> usize;
    fn new_category_name(&mut self) -> String;
    fn confirm(&mut self, message: &str) -> bool;
}

pub struct TermPrompter;

impl Prompter for TermPrompter {
    fn pick_action(&mut self, description: &str, direction: Direction) -> ResolveAction {
        println!(
            "\nNew description ({}): {}",
            direction.label(),
            description.yellow()
        );
        let choice = Select::new()
            .with_prompt("Category for this description")
            .items(&["Append to an existing category", "Create a new category"])
            .default(0)
            .interact()
            .unwrap_or(0);
        if choice == 0 {
            ResolveAction::AppendExisting
        } else {
            ResolveAction::CreateNew
        }
    }

    fn pick_existing(&mut self, options: &[String]) -> usize {
        Select::new()
            .with_prompt("Existing categories")
            .items(options)
            .default(0)
            .interact()
            .unwrap_or(0)
    }

    fn new_category_name(&mut self) -> String {
        let name: String = Input::new()
            .with_prompt("New category name")
            .interact_text()
            .unwrap_or_default();
        name
    }

    fn confirm(&mut self, message: &str) -> bool {
        Confirm::new()
            .with_prompt(message)
            .default(true)
            .interact()
            .unwrap_or(true)
    }
}

/// Assigns a category to each processed description: a cache hit in the
/// mapping store wins outright; anything unseen goes through an interactive
/// append/create decision and is persisted for every later import.
pub struct CategoryResolver<P: Prompter> {
    prompter: P,
    confirm_append: bool,
    confirm_new_name: bool,
    confirm_menu_choice: bool,
}

impl<P: Prompter> CategoryResolver<P> {
    pub fn new(prompter: P, settings: &Settings) -> Self {
        Self {
            prompter,
            confirm_append: settings.confirm_append,
            confirm_new_name: settings.confirm_new_name,
            confirm_menu_choice: settings.confirm_menu_choice,
        }
    }

    pub fn resolve(
        &mut self,
        conn: &Connection,
        catalog: &mut CategoryCatalog,
        processed_description: &str,
        direction: Direction,
    ) -> Result<String> {
        // Cache hit: never re-prompt for a description we have seen before.
        if let Some(category) = lookup_mapping(conn, processed_description)? {
            return Ok(category);
        }

        catalog.refresh(conn)?;
        let category = if catalog.is_empty() {
            // First-ever category: nothing to append to.
            self.prompt_new_name()
        } else {
            loop {
                match self.prompter.pick_action(processed_description, direction) {
                    ResolveAction::AppendExisting => {
                        if let Some(chosen) = self.prompt_existing(catalog.options()) {
                            break chosen;
                        }
                    }
                    ResolveAction::CreateNew => break self.prompt_new_name(),
                }
            }
        };

        // Exactly one mapping write per unresolved description. A duplicate
        // description is a no-op, never an error.
        conn.execute(
            "INSERT OR IGNORE INTO category_map (description, category) VALUES (?1, ?2)",
            rusqlite::params![processed_description, category],
        )?;
        catalog.refresh(conn)?;
        Ok(category)
    }

    fn prompt_existing(&mut self, options: &[String]) -> Option<String> {
        let idx = self.prompter.pick_existing(options);
        let chosen = options.get(idx)?.clone();
        if self.confirm_menu_choice && !self.prompter.confirm(&format!("Use `{chosen}`?")) {
            return None;
        }
        if self.confirm_append && !self.prompter.confirm(&format!("Append to `{chosen}`?")) {
            return None;
        }
        Some(chosen)
    }

    fn prompt_new_name(&mut self) -> String {
        loop {
            let name = self.prompter.new_category_name();
            let name = name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            if self.confirm_new_name && !self.prompter.confirm(&format!("Create `{name}`?")) {
                continue;
            }
            return name;
        }
    }
}

fn lookup_mapping(conn: &Connection, description: &str) -> Result<Option<String>> {
    match conn.query_row(
        "SELECT category FROM category_map WHERE description = ?1",
        [description],
        |row| row.get(0),
    ) {
        Ok(category) => Ok(Some(category)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
