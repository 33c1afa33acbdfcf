/// Run a Secret Santa draw (or archive the current one) from the command line.
///
/// Usage: secret-santa --group UUID --acting-user UUID [--variant adults|kids] [--archive]

use clap::Parser;
use uuid::Uuid;

use giftlist_api::{
    config::Config,
    db,
    models::secret_santa::{ShuffleContext, ShuffleVariant},
    services::secret_santa::{store::PgSecretSantaStore, SecretSantaService},
};

#[derive(Parser)]
#[command(name = "secret-santa", about = "Draw or archive Secret Santa assignments for a group")]
struct Args {
    /// Group to draw for
    #[arg(long)]
    group: Uuid,

    /// User recorded as having triggered the draw
    #[arg(long)]
    acting_user: Uuid,

    /// adults or kids
    #[arg(long, default_value = "adults")]
    variant: ShuffleVariant,

    /// Carry current assignments into next draw's exclusions instead of drawing
    #[arg(long)]
    archive: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let store = PgSecretSantaStore::new(pool);
    let ctx = ShuffleContext {
        group_id: args.group,
        acting_user_id: args.acting_user,
    };

    if args.archive {
        let carried = SecretSantaService::archive(&store, ctx).await?;
        tracing::info!("Archived {} assignment(s) for group {}", carried, args.group);
        return Ok(());
    }

    let report = match args.variant {
        ShuffleVariant::Adults => {
            SecretSantaService::shuffle_for_adults(&store, ctx, config.secret_santa_max_attempts).await
        }
        ShuffleVariant::Kids => {
            SecretSantaService::shuffle_for_kids(&store, ctx, config.secret_santa_max_attempts).await
        }
    };

    if !report.success {
        anyhow::bail!(report.error.unwrap_or_else(|| "Secret Santa draw failed".into()));
    }
    tracing::info!("Secret Santa {} draw completed for group {}", args.variant, args.group);
    Ok(())
}
