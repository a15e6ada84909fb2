use std::{
    fs::File,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::{CommandFactory, Parser, Subcommand};
use tracing::debug;

use crate::{
    board::BoardStore,
    club::{
        ClubClient, Customer, LookupOutcome,
        report::{self, format_currency},
        table::{PurchaseTable, SortColumn},
        validate::{self, PurchaseForm, ValidationError},
    },
    config::Settings,
    constants::CLUB,
    domain::{Card, Row},
    layout,
    storage::{self, SlotStore},
};

#[derive(Parser, Debug)]
#[command(name = "shopboard")]
#[command(about = "Shop dashboard cards and customer club", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, env = "SHOPBOARD_DATA_DIR", help = "Directory holding the board")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, env = "SHOPBOARD_API_URL", help = "Customer service base URL")]
    pub api_url: Option<String>,

    #[arg(long, global = true, env = "SHOPBOARD_TIMEOUT_SECS", help = "HTTP timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, global = true, help = "Keep the board in memory; nothing is saved")]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Edit dashboard cards")]
    Board {
        #[command(subcommand)]
        action: BoardCommand,
    },

    #[command(about = "Customer club lookups and purchases")]
    Club {
        #[command(subcommand)]
        action: ClubCommand,
    },

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    #[command(about = "List cards")]
    List,

    #[command(about = "Show one card with its rows")]
    Show { id: String },

    #[command(about = "Add a card")]
    Add {
        #[arg(long, help = "Title instead of the default")]
        title: Option<String>,
    },

    #[command(about = "Rename a card")]
    Rename { id: String, title: String },

    #[command(about = "Set a card colour (#RRGGBB)")]
    Color { id: String, color: String },

    #[command(about = "Remove a card")]
    Remove { id: String },

    #[command(about = "Append a row to a card")]
    AddRow {
        id: String,
        item: String,
        #[arg(help = "Price label, defaults to 0")]
        price: Option<String>,
    },

    #[command(about = "Remove a row from a card")]
    RemoveRow { id: String, row_id: String },

    #[command(about = "Move and/or resize a card on the grid")]
    Move {
        id: String,
        #[arg(long)]
        x: Option<u32>,
        #[arg(long)]
        y: Option<u32>,
        #[arg(long)]
        w: Option<u32>,
        #[arg(long)]
        h: Option<u32>,
        #[arg(long, help = "Grid columns (defaults to the widest breakpoint)")]
        cols: Option<u32>,
    },

    #[command(about = "Export the board as JSON")]
    Export {
        #[arg(long, short, help = "Output path")]
        out: Option<PathBuf>,
    },

    #[command(about = "Replace the board with a JSON export")]
    Import { path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum ClubCommand {
    #[command(about = "Look a customer up by phone number")]
    Lookup { phone: String },

    #[command(about = "Record a purchase")]
    Buy {
        phone: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        profit: String,
        #[arg(long, help = "Customer name, required for new customers")]
        name: Option<String>,
    },

    #[command(about = "List a customer's purchases")]
    Purchases {
        phone: String,
        #[arg(long, value_enum, default_value = "date")]
        sort: SortColumn,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1, help = "1-based page number")]
        page: usize,
        #[arg(long, help = "Rows per page (5, 10 or 25)")]
        per_page: Option<usize>,
    },

    #[command(about = "Change a purchase")]
    Edit {
        phone: String,
        purchase_id: u64,
        #[arg(long)]
        amount: String,
        #[arg(long, help = "Omit to keep the stored profit")]
        profit: Option<String>,
    },

    #[command(about = "Delete a purchase")]
    Delete {
        phone: String,
        purchase_id: u64,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Export a customer's purchases as CSV")]
    Export {
        phone: String,
        #[arg(long, short, help = "Output path")]
        out: Option<PathBuf>,
    },
}

fn describe_card(card: &Card) -> String {
    format!(
        "{:<36}  {:<20}  {}  @({},{}) {}x{}  {} rows",
        card.id,
        card.title,
        card.color,
        card.layout.x,
        card.layout.y,
        card.layout.w,
        card.layout.h,
        card.rows.len()
    )
}

fn describe_row(row: &Row) -> String {
    format!("{:<24} {:<10} {}", row.item, row.price, row.id)
}

fn missing_card(id: &str) -> String {
    format!("Card '{}' not found", id)
}

fn open_board(settings: &Settings) -> BoardStore<Box<dyn SlotStore>> {
    BoardStore::open(settings.slot_store())
}

pub fn run_board(action: BoardCommand, settings: &Settings) -> Result<(), String> {
    let mut board = open_board(settings);

    match action {
        BoardCommand::List => {
            if board.cards().is_empty() {
                println!("No cards.");
            }
            for card in board.cards() {
                println!("{}", describe_card(card));
            }
        }
        BoardCommand::Show { id } => {
            let card = board.card(&id).ok_or_else(|| missing_card(&id))?;
            println!("{}", describe_card(card));
            println!("{}", "-".repeat(40));
            for row in &card.rows {
                println!("{}", describe_row(row));
            }
        }
        BoardCommand::Add { title } => {
            let id = board.add_card().map_err(|e| e.to_string())?;
            if let Some(title) = title {
                board.rename_card(&id, &title).map_err(|e| e.to_string())?;
            }
            println!("{}", id);
        }
        BoardCommand::Rename { id, title } => {
            if board.card(&id).is_none() {
                return Err(missing_card(&id));
            }
            if title.trim().is_empty() {
                return Err("Title cannot be blank".to_string());
            }
            board.rename_card(&id, &title).map_err(|e| e.to_string())?;
        }
        BoardCommand::Color { id, color } => {
            if board.card(&id).is_none() {
                return Err(missing_card(&id));
            }
            if crate::color::parse_hex(&color).is_none() {
                return Err(format!("'{}' is not a #RRGGBB colour", color));
            }
            board.set_color(&id, &color).map_err(|e| e.to_string())?;
        }
        BoardCommand::Remove { id } => {
            if !board.remove_card(&id).map_err(|e| e.to_string())? {
                return Err(missing_card(&id));
            }
        }
        BoardCommand::AddRow { id, item, price } => {
            if board.card(&id).is_none() {
                return Err(missing_card(&id));
            }
            let row_id = board
                .add_row(&id, &item, price.as_deref().unwrap_or(""))
                .map_err(|e| e.to_string())?
                .ok_or_else(|| "Item cannot be blank".to_string())?;
            println!("{}", row_id);
        }
        BoardCommand::RemoveRow { id, row_id } => {
            if !board.remove_row(&id, &row_id).map_err(|e| e.to_string())? {
                return Err(format!("Row '{}' not found on card '{}'", row_id, id));
            }
        }
        BoardCommand::Move {
            id,
            x,
            y,
            w,
            h,
            cols,
        } => {
            let card = board.card(&id).ok_or_else(|| missing_card(&id))?;
            let current = card.layout.clone();
            let cols = cols.unwrap_or_else(layout::max_columns).max(1);

            if x.is_none() && y.is_none() && w.is_none() && h.is_none() {
                return Err("Nothing to change: pass --x, --y, --w or --h".to_string());
            }
            if w.is_some() || h.is_some() {
                board
                    .resize_card(&id, w.unwrap_or(current.w), h.unwrap_or(current.h), cols)
                    .map_err(|e| e.to_string())?;
            }
            if x.is_some() || y.is_some() {
                board
                    .move_card(&id, x.unwrap_or(current.x), y.unwrap_or(current.y), cols)
                    .map_err(|e| e.to_string())?;
            }
            if let Some(card) = board.card(&id) {
                println!("{}", describe_card(card));
            }
        }
        BoardCommand::Export { out } => {
            if let Some(path) = out {
                storage::write_json_atomic(&path, &board.cards()).map_err(|e| e.to_string())?;
                println!("Exported to {}", path.display());
            } else {
                let json =
                    serde_json::to_string_pretty(board.cards()).map_err(|e| e.to_string())?;
                println!("{}", json);
            }
        }
        BoardCommand::Import { path } => {
            let cards: Vec<Card> = storage::read_json(&path).map_err(|e| e.to_string())?;
            let count = board.import(cards).map_err(|e| e.to_string())?;
            println!("Imported {} cards", count);
        }
    }

    Ok(())
}

fn validation_message(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

async fn find_customer(client: &ClubClient, phone: &str) -> Result<Customer, String> {
    match client.lookup(phone).await.map_err(server_error)? {
        LookupOutcome::Found(customer) => Ok(customer),
        LookupOutcome::NotFound { phone } => Err(format!("No customer with phone {}", phone)),
    }
}

fn server_error(err: crate::club::ClubError) -> String {
    format!("Server error, try again. ({})", err)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

pub async fn run_club(action: ClubCommand, settings: &Settings) -> Result<(), String> {
    let client = ClubClient::new(&settings.api_url, settings.timeout).map_err(|e| e.to_string())?;
    debug!(api = client.base_url(), timeout = ?settings.timeout, "club client ready");

    match action {
        ClubCommand::Lookup { phone } => {
            let phone = validate::validate_phone(&phone).map_err(|e| e.to_string())?;
            match client.lookup(&phone).await.map_err(server_error)? {
                LookupOutcome::Found(customer) => print_lines(&report::summary_lines(&customer)),
                LookupOutcome::NotFound { phone } => {
                    println!("New customer {}: record a purchase with --name to register.", phone);
                }
            }
        }
        ClubCommand::Buy {
            phone,
            amount,
            profit,
            name,
        } => {
            let phone = validate::validate_phone(&phone).map_err(|e| e.to_string())?;
            let is_new = match client.lookup(&phone).await.map_err(server_error)? {
                LookupOutcome::Found(_) => false,
                LookupOutcome::NotFound { .. } => true,
            };
            let form = PurchaseForm {
                name: name.unwrap_or_default(),
                amount,
                profit,
            };
            let purchase = form
                .validate(is_new)
                .map_err(|errors| validation_message(&errors))?;
            let customer = client
                .add_purchase(&phone, &purchase)
                .await
                .map_err(|e| format!("Failed to record purchase. ({})", e))?;
            if is_new {
                println!("New customer registered.");
            }
            print_lines(&report::summary_lines(&customer));
        }
        ClubCommand::Purchases {
            phone,
            sort,
            desc,
            page,
            per_page,
        } => {
            let phone = validate::validate_phone(&phone).map_err(|e| e.to_string())?;
            let customer = find_customer(&client, &phone).await?;
            let mut table = PurchaseTable::new(customer.purchases.clone());
            if table.order_by() != sort {
                table.request_sort(sort);
            }
            if desc {
                table.request_sort(sort);
            }
            if let Some(per_page) = per_page {
                table.set_rows_per_page(per_page);
            }
            table.set_page(page.saturating_sub(1));
            print_lines(&report::table_lines(&customer.name, &table));
            println!(
                "{} purchases over {}",
                customer.flagged_purchases(),
                format_currency(CLUB.purchase_threshold)
            );
        }
        ClubCommand::Edit {
            phone,
            purchase_id,
            amount,
            profit,
        } => {
            let phone = validate::validate_phone(&phone).map_err(|e| e.to_string())?;
            let draft = validate::validate_edit(&amount, profit.as_deref())
                .map_err(|errors| validation_message(&errors))?;
            let customer = find_customer(&client, &phone).await?;
            let mut table = PurchaseTable::new(customer.purchases.clone());
            if !table.begin_edit(purchase_id) {
                return Err(format!("Purchase {} does not belong to {}", purchase_id, phone));
            }
            let edit = match table.find(purchase_id) {
                Some(current) => draft.resolve(current),
                None => return Err(format!("Purchase {} not found", purchase_id)),
            };

            match client.edit_purchase(purchase_id, &edit).await {
                Ok(updated) => {
                    table.confirm(
                        &updated,
                        format!("Amount changed to {}", format_currency(edit.amount)),
                    );
                    print_lines(&report::table_lines(&updated.name, &table));
                }
                Err(e) => {
                    table.fail(format!("Edit Failed: {}", e));
                    print_lines(&report::table_lines(&customer.name, &table));
                    return Err("Purchase was not changed".to_string());
                }
            }
        }
        ClubCommand::Delete {
            phone,
            purchase_id,
            yes,
        } => {
            let phone = validate::validate_phone(&phone).map_err(|e| e.to_string())?;
            let customer = find_customer(&client, &phone).await?;
            let mut table = PurchaseTable::new(customer.purchases.clone());
            if !table.begin_delete(purchase_id) {
                return Err(format!("Purchase {} does not belong to {}", purchase_id, phone));
            }
            let amount = table
                .find(purchase_id)
                .map(|p| format_currency(p.amount))
                .unwrap_or_default();
            if !yes && !confirm(&format!("Delete purchase {} ({})?", purchase_id, amount)) {
                table.cancel_action();
                println!("Cancelled.");
                return Ok(());
            }

            match client.delete_purchase(purchase_id).await {
                Ok(updated) => {
                    table.confirm(&updated, "Row Deleted Successfully");
                    print_lines(&report::table_lines(&updated.name, &table));
                }
                Err(e) => {
                    table.fail(format!("Delete Failed: {}", e));
                    print_lines(&report::table_lines(&customer.name, &table));
                    return Err("Purchase was not deleted".to_string());
                }
            }
        }
        ClubCommand::Export { phone, out } => {
            let phone = validate::validate_phone(&phone).map_err(|e| e.to_string())?;
            let customer = find_customer(&client, &phone).await?;
            if let Some(path) = out {
                let file = File::create(&path).map_err(|e| e.to_string())?;
                report::write_purchases_csv(file, &customer.purchases)
                    .map_err(|e| e.to_string())?;
                println!("Exported to {}", path.display());
            } else {
                report::write_purchases_csv(io::stdout(), &customer.purchases)
                    .map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

pub fn print_completions(shell: &str) -> Result<(), String> {
    use clap_complete::Shell;
    let shell = match shell {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        _ => {
            return Err(format!(
                "Unsupported shell: {}. Use bash, zsh, or fish.",
                shell
            ));
        }
    };
    clap_complete::generate(shell, &mut Cli::command(), "shopboard", &mut io::stdout());
    Ok(())
}

pub fn run_command(command: Command, settings: &Settings) -> Result<(), String> {
    match command {
        Command::Board { action } => run_board(action, settings),
        Command::Club { action } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| e.to_string())?;
            runtime.block_on(run_club(action, settings))
        }
        Command::Completions { shell } => print_completions(&shell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(dir: &std::path::Path) -> Settings {
        Settings::resolve(Some(dir.to_path_buf()), None, None, false).unwrap()
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "shopboard", "--data-dir", "/tmp/x", "board", "add-row", "a", "Eggs",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Some(Command::Board {
                action: BoardCommand::AddRow { id, item, price },
            }) => {
                assert_eq!((id.as_str(), item.as_str()), ("a", "Eggs"));
                assert!(price.is_none());
            }
            other => panic!("unexpected parse {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "shopboard", "club", "purchases", "09123456789", "--sort", "amount", "--desc",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Club {
                action: ClubCommand::Purchases {
                    sort: SortColumn::Amount,
                    desc: true,
                    page: 1,
                    ..
                }
            })
        ));

        let cli = Cli::try_parse_from([
            "shopboard", "club", "edit", "09123456789", "7", "--amount", "50",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Club {
                action: ClubCommand::Edit { purchase_id, profit, .. },
            }) => {
                assert_eq!(purchase_id, 7);
                assert!(profit.is_none());
            }
            other => panic!("unexpected parse {:?}", other),
        }

        let cli = Cli::try_parse_from(["shopboard"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_board_commands_persist_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        run_board(BoardCommand::Remove { id: "b".into() }, &settings).unwrap();
        run_board(
            BoardCommand::AddRow {
                id: "a".into(),
                item: "Eggs".into(),
                price: None,
            },
            &settings,
        )
        .unwrap();

        let board = open_board(&settings);
        assert!(board.card("b").is_none());
        let row = board.card("a").unwrap().rows.last().unwrap();
        assert_eq!((row.item.as_str(), row.price.as_str()), ("Eggs", "0"));
    }

    #[test]
    fn test_rows_print_price_as_stored() {
        let row = Row {
            id: "r1".to_string(),
            item: "Deadline".to_string(),
            price: "EOD".to_string(),
        };
        let line = describe_row(&row);
        assert!(line.contains(" EOD "));
        assert!(!line.contains('$'));
    }

    #[test]
    fn test_board_command_errors() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        assert_eq!(
            run_board(BoardCommand::Remove { id: "nope".into() }, &settings),
            Err("Card 'nope' not found".to_string())
        );
        assert_eq!(
            run_board(
                BoardCommand::AddRow {
                    id: "a".into(),
                    item: "  ".into(),
                    price: Some("5".into()),
                },
                &settings,
            ),
            Err("Item cannot be blank".to_string())
        );
        assert!(run_board(
            BoardCommand::Color {
                id: "a".into(),
                color: "teal".into(),
            },
            &settings,
        )
        .is_err());
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let export = dir.path().join("export.json");

        run_board(BoardCommand::Export { out: Some(export.clone()) }, &settings).unwrap();
        run_board(BoardCommand::Remove { id: "c".into() }, &settings).unwrap();
        run_board(BoardCommand::Import { path: export }, &settings).unwrap();

        assert!(open_board(&settings).card("c").is_some());
    }

    #[test]
    fn test_unsupported_shell() {
        assert!(print_completions("powershell").is_err());
    }
}
