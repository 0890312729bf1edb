use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use rookie_shop_admin::auth::StaticIdentity;
use rookie_shop_admin::config::ClientOptions;
use rookie_shop_admin::error::{Error, Result};
use rookie_shop_admin::models::{CreateCategory, UpdateCategory};
use rookie_shop_admin::services::Upload;
use rookie_shop_admin::store::{page_window, Notice, PageLink, PageState};
use rookie_shop_admin::RookieShop;

#[derive(Parser)]
#[clap(name = "rookie-shop-admin", version, about = "RookieShop back-office from the terminal")]
struct Cli {
    /// Base URL of the REST gateway
    #[clap(long, env = "ROOKIE_SHOP_API_URL", default_value = "http://localhost:5027")]
    api_url: String,

    /// Bearer token sent with every request
    #[clap(long, env = "ROOKIE_SHOP_TOKEN")]
    token: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage categories
    #[clap(subcommand)]
    Categories(CategoriesCommand),
    /// Manage products
    #[clap(subcommand)]
    Products(ProductsCommand),
    /// Manage stock
    #[clap(subcommand)]
    Stock(StockCommand),
    /// Browse customers
    #[clap(subcommand)]
    Customers(CustomersCommand),
    /// Manage the image gallery
    #[clap(subcommand)]
    Images(ImagesCommand),
}

#[derive(Subcommand)]
enum CategoriesCommand {
    List,
    Create {
        name: String,
        #[clap(default_value = "")]
        description: String,
    },
    Update {
        id: i64,
        name: String,
        #[clap(default_value = "")]
        description: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum ProductsCommand {
    List {
        #[clap(long, default_value_t = 1)]
        page: u32,
        #[clap(long)]
        size: Option<u32>,
        /// Search by meaning instead of listing
        #[clap(long)]
        semantic: Option<String>,
    },
    Delete {
        sku: String,
    },
}

#[derive(Subcommand)]
enum StockCommand {
    Increase { sku: String, quantity: i64 },
}

#[derive(Subcommand)]
enum CustomersCommand {
    List {
        #[clap(long, default_value_t = 1)]
        page: u32,
        #[clap(long)]
        size: Option<u32>,
    },
}

#[derive(Subcommand)]
enum ImagesCommand {
    List {
        #[clap(long, default_value_t = 1)]
        page: u32,
        #[clap(long)]
        size: Option<u32>,
    },
    Upload {
        path: PathBuf,
    },
    Delete {
        id: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        match &err {
            Error::Problem(problem) => eprintln!("{}: {}", problem.title, problem.detail),
            other => eprintln!("{}", other),
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let options = ClientOptions::default().with_api_url(&cli.api_url);
    let identity = Arc::new(StaticIdentity::new(cli.token, "roles"));
    let shop = RookieShop::new(options, identity)?;
    let store = shop.store();
    let sizes = shop.options().page_sizes;

    match cli.command {
        Command::Categories(command) => match command {
            CategoriesCommand::List => {
                for category in store.fetch_categories().await? {
                    println!("{:>5}  {:<24} {}", category.id, category.name, category.description);
                }
            }
            CategoriesCommand::Create { name, description } => {
                let id = store
                    .create_category(&CreateCategory { name, description })
                    .await?;
                println!("Created category {}", id);
                print_notice(store.categories().success);
            }
            CategoriesCommand::Update {
                id,
                name,
                description,
            } => {
                store
                    .update_category(&UpdateCategory {
                        id,
                        name,
                        description,
                    })
                    .await?;
                print_notice(store.categories().success);
            }
            CategoriesCommand::Delete { id } => {
                store.delete_category(id).await?;
                print_notice(store.categories().success);
            }
        },

        Command::Products(command) => match command {
            ProductsCommand::List {
                page,
                size,
                semantic,
            } => {
                if let Some(semantic) = semantic {
                    store.set_semantic(&semantic);
                }
                let page = store
                    .fetch_product_page(page, size.unwrap_or(sizes.products))
                    .await?;
                for product in &page.items {
                    println!(
                        "{:<12} {:<32} {:>10.2} {:>6}  {}",
                        product.sku,
                        product.name,
                        product.price,
                        product.available_quantity,
                        product.category_name
                    );
                }
                print_pages(&store.products().page);
            }
            ProductsCommand::Delete { sku } => {
                store.delete_product(&sku).await?;
                print_notice(store.products().success);
            }
        },

        Command::Stock(StockCommand::Increase { sku, quantity }) => {
            store.increase_stock(&sku, quantity).await?;
            print_notice(store.products().success);
        }

        Command::Customers(CustomersCommand::List { page, size }) => {
            let page = store
                .fetch_customer_page(page, size.unwrap_or(sizes.customers))
                .await?;
            for customer in &page.items {
                println!(
                    "{:<36} {:<16} {} {} <{}>{}",
                    customer.id,
                    customer.username,
                    customer.first_name,
                    customer.last_name,
                    customer.email,
                    if customer.enabled { "" } else { " (disabled)" }
                );
            }
            print_pages(&store.customers().page);
        }

        Command::Images(command) => match command {
            ImagesCommand::List { page, size } => {
                let page = store
                    .fetch_image_page(page, size.unwrap_or(sizes.images))
                    .await?;
                for image in &page.items {
                    println!("{:<36} {}", image.id, shop.image_url(image));
                }
                print_pages(&store.image_gallery().page);
            }
            ImagesCommand::Upload { path } => {
                let upload = Upload::from_path(&path).await?;
                store.upload_image(&upload).await?;
                print_notice(store.image_gallery().success);
            }
            ImagesCommand::Delete { id } => {
                store.delete_image(&id).await?;
                print_notice(store.image_gallery().success);
            }
        },
    }

    Ok(())
}

fn print_notice(notice: Option<Notice>) {
    if let Some(notice) = notice {
        println!("{}: {}", notice.title, notice.detail);
    }
}

fn print_pages(page: &PageState) {
    let total = page.page_count();
    let links: Vec<String> = page_window(page.page_number, Some(total))
        .into_iter()
        .map(|link| match link {
            PageLink::Previous(_) => "<".to_string(),
            PageLink::Next(_) => ">".to_string(),
            PageLink::Ellipsis => "...".to_string(),
            PageLink::Page { number, active: true } => format!("[{}]", number),
            PageLink::Page { number, .. } => number.to_string(),
        })
        .collect();

    println!("{} item(s)  {}", page.count, links.join(" "));
}
