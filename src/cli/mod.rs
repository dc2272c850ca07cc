//! Command line interface
//!
//! - `commands`: one handler per subcommand
//! - `render`: plain text output for recipes, plans and lists

pub mod commands;
pub mod render;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::planner::MealSlot;
use crate::shopping_list::RecipePick;

pub use commands::run;

#[derive(Parser, Debug)]
#[command(name = "mealplanner")]
#[command(about = "Recipe collection, weekly meal plan and shopping list")]
#[command(version)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "DATABASE_PATH")]
    pub database: Option<PathBuf>,

    /// Interface language (de, en)
    #[arg(long, global = true, env = "MEALPLANNER_LANG")]
    pub lang: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import a recipe into the cookbook
    Import {
        #[command(subcommand)]
        source: ImportSource,
    },

    /// Browse and edit the cookbook
    Recipes {
        #[command(subcommand)]
        command: RecipeCommand,
    },

    /// Weekly meal plan
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },

    /// Shopping list for a planned week or for hand-picked recipes
    Shopping {
        /// Any day of the week (default: today)
        #[arg(long, conflicts_with = "recipes")]
        date: Option<NaiveDate>,

        /// Recipe instead of the plan, as ID or ID:SERVINGS (repeatable)
        #[arg(long = "recipe", short, value_name = "ID[:SERVINGS]")]
        recipes: Vec<RecipePick>,

        /// Write the list to a text file instead of printing it
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ImportSource {
    /// Recipe web page
    Url { url: String },

    /// Text file, or "-" to read standard input
    Text { file: PathBuf },

    /// PDF with a text layer
    Pdf { file: PathBuf },

    /// One or more photos or screenshots of a single recipe
    Image {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecipeCommand {
    /// List recipes, newest first
    List {
        /// Only titles containing this text
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Show a recipe, optionally scaled
    Show {
        id: i64,

        /// Target servings (default: the recipe's own)
        #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..))]
        servings: Option<u32>,
    },

    /// Change title or base servings
    Edit {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        /// Servings the stored quantities are written for
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        servings: Option<u32>,
    },

    /// Scale a recipe and store the scaled quantities as its new base
    Rescale {
        id: i64,

        /// New base servings
        #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..))]
        servings: u32,
    },

    /// Delete a recipe and its plan entries
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Show the week containing a date
    Show {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Put a recipe on a day and meal slot
    Add {
        recipe_id: i64,

        #[arg(long)]
        date: NaiveDate,

        /// breakfast, lunch or dinner
        #[arg(long)]
        slot: MealSlot,

        /// Target servings (default: the recipe's own)
        #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..))]
        servings: Option<u32>,
    },

    /// Change the servings of a plan entry
    Servings {
        slot_id: i64,

        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        servings: u32,
    },

    /// Remove a plan entry
    Remove { slot_id: i64 },

    /// Pick recipes one card at a time
    Swipe {
        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        slot: MealSlot,

        #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..))]
        servings: Option<u32>,

        /// Only recipes whose title contains this text
        #[arg(long)]
        search: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan_add() {
        let cli = Cli::try_parse_from([
            "mealplanner", "plan", "add", "3", "--date", "2026-10-20", "--slot", "dinner", "-s", "4",
        ])
        .unwrap();
        match cli.command {
            Command::Plan {
                command:
                    PlanCommand::Add {
                        recipe_id,
                        date,
                        slot,
                        servings,
                    },
            } => {
                assert_eq!(recipe_id, 3);
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
                assert_eq!(slot, MealSlot::Dinner);
                assert_eq!(servings, Some(4));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_shopping_for_picked_recipes() {
        let cli = Cli::try_parse_from([
            "mealplanner", "shopping", "--recipe", "3:6", "-r", "5", "-o", "liste.txt",
        ])
        .unwrap();
        match cli.command {
            Command::Shopping {
                date,
                recipes,
                output,
            } => {
                assert_eq!(date, None);
                assert_eq!(
                    recipes,
                    vec![
                        RecipePick { recipe_id: 3, servings: Some(6) },
                        RecipePick { recipe_id: 5, servings: None },
                    ]
                );
                assert_eq!(output, Some(PathBuf::from("liste.txt")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_shopping_date_and_recipes_conflict() {
        let result = Cli::try_parse_from([
            "mealplanner", "shopping", "--date", "2026-10-20", "--recipe", "3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rescale() {
        let cli = Cli::try_parse_from(["mealplanner", "recipes", "rescale", "7", "--servings", "6"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Recipes {
                command: RecipeCommand::Rescale { id: 7, servings: 6 }
            }
        ));
    }

    #[test]
    fn test_zero_servings_rejected() {
        let result = Cli::try_parse_from(["mealplanner", "plan", "servings", "1", "0"]);
        assert!(result.is_err());
    }
}
