//! Dual meet CLI
//!
//! Manage a two-club squash meet: tournaments, matches, results, the
//! club score and spectator predictions.

use clap::{Parser, Subcommand};
use dualmeet::{Config, Result};

#[derive(Parser)]
#[command(name = "dualmeet")]
#[command(about = "Squash dual meet schedules, results and predictions", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Tournament management
    Tournament {
        #[command(subcommand)]
        action: TournamentCommands,
    },
    /// Match management
    Match {
        #[command(subcommand)]
        action: MatchCommands,
    },
    /// Show a tournament's matches by day, pending and finished
    Schedule {
        /// Tournament ID
        tournament: i64,
        /// Only show one day (e.g. "nov-9")
        #[arg(long)]
        day: Option<String>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Show matches and sets won by each club
    Standings {
        /// Tournament ID
        tournament: i64,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// List the players of a tournament
    Players {
        /// Tournament ID
        tournament: i64,
    },
    /// Change a player's name or club in every match of a tournament
    RenamePlayer {
        /// Tournament ID
        tournament: i64,
        /// Current name
        name: String,
        /// Current club
        club: String,
        /// New name
        #[arg(long)]
        new_name: Option<String>,
        /// New club
        #[arg(long)]
        new_club: Option<String>,
        /// Photo URL
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Predict the winner of a match
    Predict {
        /// Match ID
        match_id: i64,
        /// Predicted winner: player1 or player2
        winner: String,
        /// Your name
        #[arg(long)]
        user: String,
    },
    /// Show the prediction leaderboard
    Ranking {
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Sponsor products
    Products {
        #[command(subcommand)]
        action: ProductCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Import tournaments, matches and products from a JSON file
    Seed {
        /// Fixture file
        file: String,
    },
    /// Show database status
    Status,
}

#[derive(Subcommand)]
enum TournamentCommands {
    /// List tournaments
    List,
    /// Create a tournament
    Add {
        /// Tournament name
        name: String,
        /// First club
        club1: String,
        /// Second club
        club2: String,
        /// Event day, repeat for each day (e.g. --date "Nov 9 - 2025")
        #[arg(long = "date")]
        dates: Vec<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show a tournament with its score and schedule
    Show {
        /// Tournament ID
        id: i64,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Delete a tournament and its matches
    Delete {
        /// Tournament ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum MatchCommands {
    /// List matches
    List {
        /// Only matches of this tournament
        #[arg(long)]
        tournament: Option<i64>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Schedule a match
    Add {
        /// Tournament ID
        tournament: i64,
        /// Display date (e.g. "9 nov")
        #[arg(long)]
        date: String,
        /// Calendar date (YYYY-MM-DD)
        #[arg(long)]
        raw_date: Option<String>,
        /// Start time (HH:MM, 24-hour)
        #[arg(long)]
        time: String,
        /// Player 1 name
        #[arg(long)]
        player1: String,
        /// Player 1 club (defaults to the tournament's first club)
        #[arg(long)]
        player1_club: Option<String>,
        /// Player 2 name
        #[arg(long)]
        player2: String,
        /// Player 2 club (defaults to the tournament's second club)
        #[arg(long)]
        player2_club: Option<String>,
    },
    /// Record a final score
    Result {
        /// Match ID
        id: i64,
        score1: u32,
        score2: u32,
        /// Set count, e.g. "3 - 1"
        #[arg(long)]
        sets: Option<String>,
    },
    /// Delete a match
    Delete {
        /// Match ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum ProductCommands {
    /// List products
    List,
    /// Add a product
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Delete a product
    Delete { id: i64 },
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Seed { file } => commands::data_seed(&config, &file),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Tournament { action } => match action {
            TournamentCommands::List => commands::tournament_list(&config),
            TournamentCommands::Add {
                name,
                club1,
                club2,
                dates,
                description,
            } => commands::tournament_add(&config, name, club1, club2, dates, description),
            TournamentCommands::Show { id, format } => {
                commands::tournament_show(&config, id, format)
            }
            TournamentCommands::Delete { id } => commands::tournament_delete(&config, id),
        },
        Commands::Match { action } => match action {
            MatchCommands::List { tournament, format } => {
                commands::match_list(&config, tournament, format)
            }
            MatchCommands::Add {
                tournament,
                date,
                raw_date,
                time,
                player1,
                player1_club,
                player2,
                player2_club,
            } => commands::match_add(
                &config,
                tournament,
                commands::MatchArgs {
                    date,
                    raw_date,
                    time,
                    player1,
                    player1_club,
                    player2,
                    player2_club,
                },
            ),
            MatchCommands::Result {
                id,
                score1,
                score2,
                sets,
            } => commands::match_result(&config, id, score1, score2, sets),
            MatchCommands::Delete { id } => commands::match_delete(&config, id),
        },
        Commands::Schedule {
            tournament,
            day,
            format,
        } => commands::schedule(&config, tournament, day, format),
        Commands::Standings { tournament, format } => {
            commands::standings(&config, tournament, format)
        }
        Commands::Players { tournament } => commands::players(&config, tournament),
        Commands::RenamePlayer {
            tournament,
            name,
            club,
            new_name,
            new_club,
            photo_url,
        } => commands::rename_player(&config, tournament, name, club, new_name, new_club, photo_url),
        Commands::Predict {
            match_id,
            winner,
            user,
        } => commands::predict(&config, match_id, &winner, &user),
        Commands::Ranking { format } => commands::ranking(&config, format),
        Commands::Products { action } => match action {
            ProductCommands::List => commands::product_list(&config),
            ProductCommands::Add {
                name,
                description,
                image_url,
                link,
                price,
            } => commands::product_add(&config, name, description, image_url, link, price),
            ProductCommands::Delete { id } => commands::product_delete(&config, id),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use chrono::NaiveDate;
    use dualmeet::data::{Database, Fixture, NewMatch, NewProduct, NewTournament};
    use dualmeet::roster::{club_roster, roster};
    use dualmeet::schedule::{format_time_12h, DayBucket};
    use dualmeet::standings::{self, ClubScore, TournamentOverview};
    use dualmeet::{
        Match, MatchId, MatchStatus, MeetError, Player, PlayerSide, ProductId, Tournament,
        TournamentId,
    };

    pub struct MatchArgs {
        pub date: String,
        pub raw_date: Option<String>,
        pub time: String,
        pub player1: String,
        pub player1_club: Option<String>,
        pub player2: String,
        pub player2_club: Option<String>,
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        println!("Created data/ directory");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'dualmeet data seed <file.json>' or 'dualmeet tournament add'");
        println!("  3. Run 'dualmeet standings <tournament>' to see the club score");

        Ok(())
    }

    pub fn data_seed(config: &Config, file: &str) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;

        println!("Importing {}...", file);
        let fixture = Fixture::load(file)?;
        let summary = fixture.import(&db)?;

        println!(
            "Stored {} tournaments, {} matches, {} products",
            summary.tournaments, summary.matches, summary.products
        );
        if summary.skipped > 0 {
            println!("Skipped {} invalid matches (see log)", summary.skipped);
        }
        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.get_stats()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:         {}", config.data.database_path);
        println!("  Tournaments:  {}", stats.tournament_count);
        println!(
            "  Matches:      {} ({} finished)",
            stats.match_count, stats.finished_count
        );
        println!("  Predictions:  {}", stats.prediction_count);
        println!("  Products:     {}", stats.product_count);

        Ok(())
    }

    pub fn tournament_list(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let tournaments = db.get_all_tournaments()?;

        if tournaments.is_empty() {
            println!("No tournaments yet. Create one with 'dualmeet tournament add'.");
            return Ok(());
        }

        println!("{:>4}  {:<36}  {:<25}  Dates", "ID", "Name", "Clubs");
        println!("{}", "─".repeat(90));
        for t in &tournaments {
            println!(
                "{:>4}  {:<36}  {:<25}  {}",
                t.id.0,
                t.name,
                format!("{} vs {}", t.club1, t.club2),
                t.dates.join(", ")
            );
        }
        Ok(())
    }

    pub fn tournament_add(
        config: &Config,
        name: String,
        club1: String,
        club2: String,
        dates: Vec<String>,
        description: Option<String>,
    ) -> Result<()> {
        if club1 == club2 {
            return Err(MeetError::Parse(
                "a dual meet needs two different clubs".to_string(),
            ));
        }
        let db = Database::open(&config.data.database_path)?;
        let tournament = db.create_tournament(&NewTournament {
            name,
            dates,
            club1,
            club2,
            description,
        })?;
        println!("Created tournament {} ({})", tournament.name, tournament.id);
        Ok(())
    }

    pub fn tournament_show(config: &Config, id: i64, format: OutputFormat) -> Result<()> {
        let overview = load_overview(config, id)?;

        match format {
            OutputFormat::Json => print_json(&overview),
            OutputFormat::Table => {
                println!("{}", overview.tournament.name);
                if let Some(description) = &overview.tournament.description {
                    println!("{}", description);
                }
                println!();
                print_score(&overview.tournament, &overview.score);
                for bucket in &overview.schedule.buckets {
                    println!();
                    print_bucket(config, bucket);
                }
                Ok(())
            }
        }
    }

    pub fn tournament_delete(config: &Config, id: i64) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        db.delete_tournament(TournamentId(id))?;
        println!("Deleted tournament {}", id);
        Ok(())
    }

    pub fn match_list(config: &Config, tournament: Option<i64>, format: OutputFormat) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let matches = db.get_matches(tournament.map(TournamentId))?;

        match format {
            OutputFormat::Json => print_json(&matches),
            OutputFormat::Table => {
                if matches.is_empty() {
                    println!("No matches found.");
                }
                for m in &matches {
                    println!("{:<8} {}", m.date, match_line(config, m));
                }
                Ok(())
            }
        }
    }

    pub fn match_add(config: &Config, tournament: i64, args: MatchArgs) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let id = TournamentId(tournament);
        let t = db
            .get_tournament(id)?
            .ok_or(MeetError::TournamentNotFound(id))?;

        let raw_date = match args.raw_date {
            Some(raw) => Some(
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|e| MeetError::Parse(format!("Invalid date {}: {}", raw, e)))?,
            ),
            None => None,
        };

        let player1_club = args.player1_club.unwrap_or_else(|| t.club1.clone());
        let player2_club = args.player2_club.unwrap_or_else(|| t.club2.clone());
        for club in [&player1_club, &player2_club] {
            if !t.has_club(club) {
                log::warn!("{} is not playing in {}; the match will not count", club, t.name);
            }
        }

        let created = db.create_match(&NewMatch {
            date: args.date,
            raw_date,
            time: args.time,
            status: MatchStatus::Pendiente,
            player1: Player::new(&args.player1, &player1_club),
            player2: Player::new(&args.player2, &player2_club),
            score1: None,
            score2: None,
            sets: None,
            photo_url: None,
            tournament_id: Some(id),
        })?;

        println!("Scheduled match {}: {}", created.id, match_line(config, &created));
        Ok(())
    }

    pub fn match_result(
        config: &Config,
        id: i64,
        score1: u32,
        score2: u32,
        sets: Option<String>,
    ) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let id = MatchId(id);
        db.record_result(id, score1, score2, sets.as_deref())?;
        let graded = db.grade_predictions()?;

        if let Some(m) = db.get_match(id)? {
            println!("{}", match_line(config, &m));
        }
        log::debug!("{} predictions graded", graded);
        Ok(())
    }

    pub fn match_delete(config: &Config, id: i64) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        db.delete_match(MatchId(id))?;
        println!("Deleted match {}", id);
        Ok(())
    }

    pub fn schedule(
        config: &Config,
        tournament: i64,
        day: Option<String>,
        format: OutputFormat,
    ) -> Result<()> {
        let overview = load_overview(config, tournament)?;
        let buckets: Vec<&DayBucket> = match &day {
            Some(key) => overview.schedule.get(key).into_iter().collect(),
            None => overview.schedule.buckets.iter().collect(),
        };

        if buckets.is_empty() {
            let keys: Vec<&str> = overview
                .schedule
                .buckets
                .iter()
                .map(|b| b.key.as_str())
                .collect();
            println!(
                "No day {} in this tournament. Available: {}",
                day.unwrap_or_default(),
                keys.join(", ")
            );
            return Ok(());
        }

        match format {
            OutputFormat::Json => print_json(&buckets),
            OutputFormat::Table => {
                for (i, bucket) in buckets.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    print_bucket(config, bucket);
                }
                Ok(())
            }
        }
    }

    pub fn standings(config: &Config, tournament: i64, format: OutputFormat) -> Result<()> {
        let overview = load_overview(config, tournament)?;
        match format {
            OutputFormat::Json => print_json(&overview.score),
            OutputFormat::Table => {
                print_score(&overview.tournament, &overview.score);
                Ok(())
            }
        }
    }

    pub fn players(config: &Config, tournament: i64) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let id = TournamentId(tournament);
        let t = db
            .get_tournament(id)?
            .ok_or(MeetError::TournamentNotFound(id))?;
        let players = roster(&db.get_matches(Some(id))?);

        if players.is_empty() {
            println!("No players yet.");
            return Ok(());
        }

        for club in [&t.club1, &t.club2] {
            println!("{}", club);
            for player in club_roster(&players, club) {
                println!("  {}", player.name);
            }
        }

        let others: Vec<&Player> = players.iter().filter(|p| !t.has_club(&p.club)).collect();
        if !others.is_empty() {
            println!("Other clubs");
            for player in others {
                println!("  {} ({})", player.name, player.club);
            }
        }
        Ok(())
    }

    pub fn rename_player(
        config: &Config,
        tournament: i64,
        name: String,
        club: String,
        new_name: Option<String>,
        new_club: Option<String>,
        photo_url: Option<String>,
    ) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let old = Player::new(&name, &club);
        let new = Player {
            name: new_name.unwrap_or_else(|| name.clone()),
            club: new_club.unwrap_or_else(|| club.clone()),
            photo_url,
        };

        let changed = db.rename_player(TournamentId(tournament), &old, &new)?;
        if changed == 0 {
            println!("No matches found for {} ({})", name, club);
        } else {
            println!("Updated {} match slots", changed);
        }
        Ok(())
    }

    pub fn predict(config: &Config, match_id: i64, winner: &str, user: &str) -> Result<()> {
        let side = PlayerSide::parse(winner).ok_or_else(|| {
            MeetError::Parse(format!("Unknown winner: {}. Use player1 or player2.", winner))
        })?;
        if user.trim().is_empty() {
            return Err(MeetError::Parse("a user name is required".to_string()));
        }

        let db = Database::open(&config.data.database_path)?;
        let id = MatchId(match_id);
        let m = db.get_match(id)?.ok_or(MeetError::MatchNotFound(id))?;
        db.create_prediction(id, side, user.trim())?;
        println!(
            "{} picks {} ({})",
            user.trim(),
            m.player(side).name,
            m.player(side).club
        );
        Ok(())
    }

    pub fn ranking(config: &Config, format: OutputFormat) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        db.grade_predictions()?;
        let table = standings::ranking(&db.get_predictions(None)?, &db.get_matches(None)?);

        match format {
            OutputFormat::Json => print_json(&table),
            OutputFormat::Table => {
                if table.is_empty() {
                    println!("No predictions yet.");
                    return Ok(());
                }
                println!(
                    "{:>3}  {:<24}  {:>7}  {:>5}  {:>8}",
                    "#", "User", "Correct", "Total", "Accuracy"
                );
                println!("{}", "─".repeat(55));
                for (i, entry) in table.iter().enumerate() {
                    println!(
                        "{:>3}  {:<24}  {:>7}  {:>5}  {:>7.0}%",
                        i + 1,
                        entry.user_name,
                        entry.correct,
                        entry.total,
                        entry.accuracy
                    );
                }
                Ok(())
            }
        }
    }

    pub fn product_list(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let products = db.get_products()?;
        if products.is_empty() {
            println!("No sponsor products.");
        }
        for p in &products {
            let price = p.price.map(|v| format!("${:.2}", v)).unwrap_or_default();
            println!("{:>4}  {:<30}  {:>10}  {}", p.id.0, p.name, price, p.description);
            if let Some(link) = &p.link {
                println!("      {}", link);
            }
        }
        Ok(())
    }

    pub fn product_add(
        config: &Config,
        name: String,
        description: String,
        image_url: Option<String>,
        link: Option<String>,
        price: Option<f64>,
    ) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let product = db.create_product(&NewProduct {
            name,
            description,
            image_url,
            link,
            price,
        })?;
        println!("Added product {} ({})", product.name, product.id.0);
        Ok(())
    }

    pub fn product_delete(config: &Config, id: i64) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        if db.delete_product(ProductId(id))? {
            println!("Deleted product {}", id);
        } else {
            println!("No product with ID {}", id);
        }
        Ok(())
    }

    fn load_overview(config: &Config, id: i64) -> Result<TournamentOverview> {
        let db = Database::open(&config.data.database_path)?;
        let id = TournamentId(id);
        standings::overview(&db, id, &config.schedule)?.ok_or(MeetError::TournamentNotFound(id))
    }

    fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn print_score(tournament: &Tournament, score: &ClubScore) {
        let width = tournament.club1.len().max(tournament.club2.len()).max(4);
        println!("{:<width$}  {:>8}  {:>5}", "Club", "Partidos", "Sets");
        println!("{}", "─".repeat(width + 17));
        println!(
            "{:<width$}  {:>8}  {:>5}",
            tournament.club1, score.matches_won.club1, score.sets_won.club1
        );
        println!(
            "{:<width$}  {:>8}  {:>5}",
            tournament.club2, score.matches_won.club2, score.sets_won.club2
        );
    }

    fn print_bucket(config: &Config, bucket: &DayBucket) {
        let title = bucket
            .day
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Sin fecha".to_string());
        println!("{} ({})", title, bucket.key);
        println!("{}", "─".repeat(60));

        println!("  Próximos");
        if bucket.pending.is_empty() {
            println!("    (none)");
        }
        for m in &bucket.pending {
            println!("    {}", match_line(config, m));
        }

        println!("  Finalizados");
        if bucket.finished.is_empty() {
            println!("    (none)");
        }
        for m in &bucket.finished {
            println!("    {}", match_line(config, m));
        }
    }

    fn match_line(config: &Config, m: &Match) -> String {
        let time = if config.display.twelve_hour_clock {
            format_time_12h(&m.time)
        } else {
            m.time.clone()
        };
        let result = match (m.score1, m.score2) {
            (Some(s1), Some(s2)) if m.is_finished() => match m.sets_text() {
                Some(sets) => format!("{}-{} [{}]", s1, s2, sets),
                None => format!("{}-{}", s1, s2),
            },
            _ => m.status.to_string(),
        };
        format!(
            "#{:<4} {:>8}  {} ({}) vs {} ({})  {}",
            m.id.0, time, m.player1.name, m.player1.club, m.player2.name, m.player2.club, result
        )
    }
}
