//! Subcommand handlers

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use sqlx::SqlitePool;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{info, warn};

use super::render::{render_recipe, render_recipe_list, render_week_plan};
use super::{Cli, Command, ImportSource, PlanCommand, RecipeCommand};
use crate::config::AppConfig;
use crate::db;
use crate::errors::ImportError;
use crate::import::{self, ImportedRecipe};
use crate::localization::{t_args_lang, t_lang};
use crate::planner::{default_target_servings, MealSlot, RecipeDeck, Week, WeekPlan};
use crate::scaling::ScalingEngine;
use crate::shopping_list::{shopping_list_for_recipes, shopping_list_for_week, RecipePick};

/// Everything a command needs
pub struct App {
    pub pool: SqlitePool,
    pub config: AppConfig,
    pub engine: ScalingEngine,
}

impl App {
    fn lang(&self) -> Option<&str> {
        Some(self.config.language.as_str())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Apply command line overrides, open the database and dispatch
pub async fn run(cli: Cli, mut config: AppConfig) -> Result<()> {
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(lang) = cli.lang {
        config.language = lang.to_lowercase();
    }

    let pool = db::connect(&config.database_path).await?;
    let engine = ScalingEngine::new(config.rounding.clone());
    let app = App {
        pool,
        config,
        engine,
    };

    match cli.command {
        Command::Import { source } => import_recipe(&app, source).await,
        Command::Recipes { command } => recipes(&app, command).await,
        Command::Plan { command } => plan(&app, command).await,
        Command::Shopping {
            date,
            recipes,
            output,
        } => {
            if recipes.is_empty() {
                shopping_for_week(&app, date.unwrap_or_else(today), output.as_deref()).await
            } else {
                shopping_for_recipes(&app, &recipes, output.as_deref()).await
            }
        }
    }
}

async fn read_text_source(file: &Path) -> Result<String, ImportError> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        Ok(text)
    } else {
        Ok(tokio::fs::read_to_string(file).await?)
    }
}

async fn fetch_import(app: &App, source: ImportSource) -> Result<ImportedRecipe, ImportError> {
    match source {
        ImportSource::Url { url } => import::from_url(&url, &app.config.http).await,
        ImportSource::Text { file } => import::from_text(&read_text_source(&file).await?),
        ImportSource::Pdf { file } => import::from_pdf(&file).await,
        ImportSource::Image { files } => import::from_images(files.as_slice(), &app.config.ocr).await,
    }
}

async fn import_recipe(app: &App, source: ImportSource) -> Result<()> {
    let imported = match import::run_cancellable(fetch_import(app, source)).await {
        Ok(imported) => imported,
        Err(ImportError::Cancelled) => {
            println!("{}", t_lang("import-cancelled", app.lang()));
            return Ok(());
        }
        Err(e) => {
            let error = e.to_string();
            return Err(anyhow::anyhow!(t_args_lang(
                "import-failed",
                &[("error", error.as_str())],
                app.lang()
            )));
        }
    };

    let recipe = imported.into_new_recipe(app.config.default_servings, app.lang());
    let id = db::create_recipe(&app.pool, &recipe).await?;
    info!(recipe_id = id, title = %recipe.title, source = %recipe.source, "Recipe imported");

    let id_text = id.to_string();
    let ingredient_count = recipe.ingredients.len().to_string();
    let step_count = recipe.steps.len().to_string();
    println!(
        "{}",
        t_args_lang(
            "import-success",
            &[
                ("title", recipe.title.as_str()),
                ("id", id_text.as_str()),
                ("ingredients", ingredient_count.as_str()),
                ("steps", step_count.as_str()),
            ],
            app.lang(),
        )
    );
    if recipe.ingredients.is_empty() {
        println!("{}", t_lang("import-no-ingredients", app.lang()));
    }
    Ok(())
}

fn print_with_id(key: &str, id: i64, lang: Option<&str>) {
    let id_text = id.to_string();
    println!("{}", t_args_lang(key, &[("id", id_text.as_str())], lang));
}

async fn recipes(app: &App, command: RecipeCommand) -> Result<()> {
    match command {
        RecipeCommand::List { search } => {
            let recipes = db::list_recipes(&app.pool, search.as_deref()).await?;
            print!("{}", render_recipe_list(&recipes, app.lang()));
        }
        RecipeCommand::Show { id, servings } => {
            let Some(recipe) = db::get_recipe(&app.pool, id).await? else {
                print_with_id("recipe-not-found", id, app.lang());
                return Ok(());
            };
            let target = servings.unwrap_or(recipe.base_servings);
            let scaled = app
                .engine
                .scale_recipe(&recipe, target)
                .context("Failed to scale recipe")?;
            print!("{}", render_recipe(&recipe, &scaled, target, app.lang()));
        }
        RecipeCommand::Edit {
            id,
            title,
            servings,
        } => {
            let Some(recipe) = db::get_recipe(&app.pool, id).await? else {
                print_with_id("recipe-not-found", id, app.lang());
                return Ok(());
            };
            let mut updated = recipe.to_new_recipe();
            if let Some(title) = title {
                updated.title = import::validate_title(&title)
                    .context("Title must not be empty")?;
            }
            if let Some(servings) = servings {
                updated.base_servings = servings;
            }
            db::update_recipe(&app.pool, id, &updated).await?;
            print_with_id("recipe-updated", id, app.lang());
        }
        RecipeCommand::Rescale { id, servings } => {
            let Some(recipe) = db::get_recipe(&app.pool, id).await? else {
                print_with_id("recipe-not-found", id, app.lang());
                return Ok(());
            };
            let rescaled = app
                .engine
                .rescale_recipe(&recipe, servings)
                .context("Failed to scale recipe")?;
            db::update_recipe(&app.pool, id, &rescaled).await?;
            info!(recipe_id = id, from = recipe.base_servings, to = servings, "Recipe rescaled");

            let id_text = id.to_string();
            let servings_text = servings.to_string();
            println!(
                "{}",
                t_args_lang(
                    "recipe-rescaled",
                    &[("id", id_text.as_str()), ("servings", servings_text.as_str())],
                    app.lang(),
                )
            );
        }
        RecipeCommand::Delete { id } => {
            if db::delete_recipe(&app.pool, id).await? {
                info!(recipe_id = id, "Recipe deleted");
                print_with_id("recipe-deleted", id, app.lang());
            } else {
                print_with_id("recipe-not-found", id, app.lang());
            }
        }
    }
    Ok(())
}

async fn plan(app: &App, command: PlanCommand) -> Result<()> {
    match command {
        PlanCommand::Show { date } => {
            let week = Week::containing(date.unwrap_or_else(today));
            let slots = db::list_plan_slots(&app.pool, week).await?;
            let titles: HashMap<i64, String> = db::list_recipes(&app.pool, None)
                .await?
                .into_iter()
                .map(|recipe| (recipe.id, recipe.title))
                .collect();
            let plan = WeekPlan::from_slots(week, slots);
            print!("{}", render_week_plan(&plan, &titles, app.lang()));
        }
        PlanCommand::Add {
            recipe_id,
            date,
            slot,
            servings,
        } => {
            let Some(recipe) = db::get_recipe(&app.pool, recipe_id).await? else {
                print_with_id("recipe-not-found", recipe_id, app.lang());
                return Ok(());
            };
            let servings = servings.unwrap_or_else(|| default_target_servings(&recipe.summary()));
            add_to_plan(app, &recipe.title, recipe_id, date, slot, servings).await?;
        }
        PlanCommand::Servings { slot_id, servings } => {
            if db::update_plan_slot_servings(&app.pool, slot_id, servings).await? {
                let id_text = slot_id.to_string();
                let servings_text = servings.to_string();
                println!(
                    "{}",
                    t_args_lang(
                        "plan-slot-updated",
                        &[("id", id_text.as_str()), ("servings", servings_text.as_str())],
                        app.lang(),
                    )
                );
            } else {
                print_with_id("plan-slot-not-found", slot_id, app.lang());
            }
        }
        PlanCommand::Remove { slot_id } => {
            if db::delete_plan_slot(&app.pool, slot_id).await? {
                print_with_id("plan-slot-removed", slot_id, app.lang());
            } else {
                print_with_id("plan-slot-not-found", slot_id, app.lang());
            }
        }
        PlanCommand::Swipe {
            date,
            slot,
            servings,
            search,
        } => swipe(app, date, slot, servings, search.as_deref()).await?,
    }
    Ok(())
}

async fn add_to_plan(
    app: &App,
    title: &str,
    recipe_id: i64,
    date: NaiveDate,
    slot: MealSlot,
    servings: u32,
) -> Result<()> {
    let slot_id = db::add_plan_slot(&app.pool, date, slot, recipe_id, servings).await?;
    info!(slot_id, recipe_id, %date, meal_slot = %slot, servings, "Recipe planned");

    let date_text = date.format("%d.%m.%Y").to_string();
    let slot_label = t_lang(slot.label_key(), app.lang());
    let servings_text = servings.to_string();
    println!(
        "{}",
        t_args_lang(
            "plan-slot-added",
            &[
                ("title", title),
                ("date", date_text.as_str()),
                ("slot", slot_label.as_str()),
                ("servings", servings_text.as_str()),
            ],
            app.lang(),
        )
    );
    Ok(())
}

async fn swipe(
    app: &App,
    date: NaiveDate,
    slot: MealSlot,
    servings: Option<u32>,
    search: Option<&str>,
) -> Result<()> {
    let mut deck = RecipeDeck::new(db::list_recipes(&app.pool, search).await?);
    if deck.is_empty() {
        println!("{}", t_lang("swipe-empty", app.lang()));
        return Ok(());
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(card) = deck.current().cloned() else {
            break;
        };
        let target = servings.unwrap_or_else(|| default_target_servings(&card));
        let position = deck.position_label();
        let target_text = target.to_string();
        println!(
            "{}",
            t_args_lang(
                "swipe-card",
                &[
                    ("position", position.as_str()),
                    ("title", card.title.as_str()),
                    ("servings", target_text.as_str()),
                ],
                app.lang(),
            )
        );
        println!("{}", t_lang("swipe-prompt", app.lang()));

        let Some(answer) = input.next_line().await? else {
            break;
        };
        match answer.trim().to_lowercase().as_str() {
            "y" | "j" => {
                add_to_plan(app, &card.title, card.id, date, slot, target).await?;
                deck.skip();
            }
            "n" | "" => {
                deck.skip();
            }
            "s" => deck.shuffle(&mut rand::thread_rng()),
            "q" => break,
            other => warn!(answer = other, "Unknown swipe answer"),
        }
    }

    println!("{}", t_lang("swipe-done", app.lang()));
    Ok(())
}

async fn shopping_for_week(app: &App, date: NaiveDate, output: Option<&Path>) -> Result<()> {
    let week = Week::containing(date);
    let list = shopping_list_for_week(&app.pool, week, &app.engine).await?;
    if list.is_empty() {
        println!("{}", t_lang("shopping-list-empty", app.lang()));
        return Ok(());
    }

    let week_text = week.to_string();
    let heading = t_args_lang("shopping-list-heading", &[("week", week_text.as_str())], app.lang());
    write_shopping_list(app, &list.render_text(&heading, app.lang()), output).await
}

async fn shopping_for_recipes(app: &App, picks: &[RecipePick], output: Option<&Path>) -> Result<()> {
    let list = shopping_list_for_recipes(&app.pool, picks, &app.engine).await?;
    let count = picks.len().to_string();
    let heading = t_args_lang(
        "shopping-list-heading-recipes",
        &[("count", count.as_str())],
        app.lang(),
    );
    write_shopping_list(app, &list.render_text(&heading, app.lang()), output).await
}

async fn write_shopping_list(app: &App, text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, text)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let path_text = path.display().to_string();
            println!(
                "{}",
                t_args_lang("shopping-list-saved", &[("path", path_text.as_str())], app.lang())
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}
