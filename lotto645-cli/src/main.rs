mod display;
mod import;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use lotto645_analysis::DrawHistory;
use lotto645_analysis::frequency::{
    calculate_frequency_with_bonus, cold_numbers, frequency_stats, hot_numbers, sorted_by_frequency,
};
use lotto645_analysis::patterns::{
    analyze_ac_distribution, analyze_consecutive, analyze_high_low, analyze_odd_even,
    analyze_range_distribution, profile_combination,
};
use lotto645_analysis::recommend::{Strategy, generate_recommendation, rng_from_seed};
use lotto645_analysis::timeline::{
    absence_period, analyze_by_month, analyze_trend, recent_cold_numbers, recent_hot_numbers,
    yearly_hot_numbers,
};
use lotto645_db::db::{count_draws, db_path, fetch_all_draws, fetch_last_draws, insert_draw, migrate, open_db};
use lotto645_db::models::{Draw, PICK_COUNT, validate_date, validate_draw};
use lotto645_db::rusqlite::Connection;
use crate::display::*;

#[derive(Parser)]
#[command(name = "lotto645", about = "Statistiques et suggestions pour le Lotto 6/45")]
struct Cli {
    /// Base SQLite des tirages (défaut : ./data/lotto645.db)
    #[arg(long, global = true, env = "LOTTO645_DB")]
    db: Option<PathBuf>,

    /// Sortie JSON au lieu des tableaux
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis un fichier JSON (all.json ou latest.json)
    Import {
        /// Chemin vers le fichier JSON
        #[arg(short, long, default_value = "data/all.json")]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Ajouter un tirage manuellement
    Add,

    /// Fréquences, statistiques et numéros chauds/froids
    Stats {
        /// Fenêtre d'analyse (nombre de tirages, défaut : tout l'historique)
        #[arg(short, long)]
        window: Option<usize>,

        /// Compter aussi le numéro bonus
        #[arg(long)]
        bonus: bool,

        /// Trier du moins fréquent au plus fréquent
        #[arg(long)]
        ascending: bool,

        /// Nombre de numéros chauds/froids
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Pair/impair, bas/haut, tranches, suites et valeur AC
    Patterns {
        /// Fenêtre d'analyse (nombre de tirages, défaut : tout l'historique)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Numéros les plus sortis sur les derniers tirages
    Hot {
        #[arg(short, long, default_value = "4")]
        weeks: usize,

        #[arg(short, long, default_value = "6")]
        top: usize,
    },

    /// Numéros absents des derniers tirages
    Cold {
        #[arg(short, long, default_value = "10")]
        weeks: usize,
    },

    /// Retard de chaque numéro depuis sa dernière sortie
    Absence {
        /// Nombre de numéros affichés
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Fréquences par mois
    Monthly {
        /// Nombre de mois affichés (les plus récents)
        #[arg(short, long, default_value = "12")]
        months: usize,
    },

    /// Numéros chauds par année
    Yearly,

    /// Tendance récente contre l'historique complet
    Trend {
        #[arg(short, long, default_value = "12")]
        weeks: usize,

        /// Nombre de numéros affichés
        #[arg(short, long, default_value = "45")]
        top: usize,
    },

    /// Suggérer des grilles
    Recommend {
        /// Stratégie : frequency, balanced, cold ou random (toute autre valeur : random)
        #[arg(short, long, default_value = "frequency")]
        strategy: String,

        /// Nombre de grilles
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Analyser une grille de 6 numéros
    Check {
        /// 6 numéros
        numbers: Vec<u8>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let path = cli.db.clone().unwrap_or_else(db_path);
    let conn = open_db(&path)?;
    migrate(&conn)?;
    tracing::debug!(path = %path.display(), "base ouverte");

    let json = cli.json;
    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file, json),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last, json),
        Command::Add => cmd_add(&conn),
        Command::Stats { window, bonus, ascending, top } => cmd_stats(&conn, window, bonus, ascending, top, json),
        Command::Patterns { window } => cmd_patterns(&conn, window, json),
        Command::Hot { weeks, top } => cmd_hot(&conn, weeks, top, json),
        Command::Cold { weeks } => cmd_cold(&conn, weeks, json),
        Command::Absence { top } => cmd_absence(&conn, top, json),
        Command::Monthly { months } => cmd_monthly(&conn, months, json),
        Command::Yearly => cmd_yearly(&conn, json),
        Command::Trend { weeks, top } => cmd_trend(&conn, weeks, top, json),
        Command::Recommend { strategy, count, seed } => cmd_recommend(&conn, &strategy, count, seed, json),
        Command::Check { numbers } => cmd_check(&conn, &numbers, json),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Sérialisation JSON impossible")?;
    println!("{out}");
    Ok(())
}

/// Charge tout l'historique ; `None` (avec un message) si la base est vide.
fn load_history(conn: &Connection) -> Result<Option<DrawHistory>> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotto645 import");
        return Ok(None);
    }
    let history = DrawHistory::new(fetch_all_draws(conn)?);
    tracing::debug!(draws = history.len(), "historique chargé");
    Ok(Some(history))
}

fn window_of(history: &DrawHistory, window: Option<usize>) -> &[Draw] {
    match window {
        Some(n) => history.recent(n),
        None => history.as_slice(),
    }
}

fn cmd_import(conn: &Connection, file: &Path, json: bool) -> Result<()> {
    let result = import::import_json(conn, file)?;
    if json {
        return print_json(&result);
    }
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32, json: bool) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotto645 import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    if json {
        return print_json(&draws);
    }
    display_draws(&draws);
    Ok(())
}

#[derive(Serialize)]
struct StatsReport<'a> {
    overview: lotto645_analysis::DatasetOverview,
    window: usize,
    stats: lotto645_analysis::frequency::FrequencyStats,
    frequency: &'a [lotto645_analysis::frequency::NumberCount],
    hot: Vec<lotto645_analysis::frequency::NumberCount>,
    cold: Vec<lotto645_analysis::frequency::NumberCount>,
}

fn cmd_stats(
    conn: &Connection,
    window: Option<usize>,
    bonus: bool,
    ascending: bool,
    top: usize,
    json: bool,
) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let draws = window_of(&history, window);

    let stats = frequency_stats(draws)?;
    let sorted = if bonus {
        calculate_frequency_with_bonus(draws).sorted(ascending)
    } else {
        sorted_by_frequency(draws, ascending)
    };
    let hot = hot_numbers(draws, top);
    let cold = cold_numbers(draws, top);

    if json {
        return print_json(&StatsReport {
            overview: history.overview()?,
            window: draws.len(),
            stats,
            frequency: &sorted,
            hot,
            cold,
        });
    }

    display_overview(&history.overview()?);
    display_frequency(&sorted, &stats, draws.len(), bonus);
    display_hot_cold(&hot, &cold);
    Ok(())
}

#[derive(Serialize)]
struct PatternsReport {
    window: usize,
    odd_even: lotto645_analysis::patterns::OddEvenAnalysis,
    high_low: lotto645_analysis::patterns::HighLowAnalysis,
    ranges: Vec<lotto645_analysis::patterns::RangeBucket>,
    consecutive: lotto645_analysis::patterns::ConsecutiveDistribution,
    ac: std::collections::BTreeMap<u8, u32>,
}

fn cmd_patterns(conn: &Connection, window: Option<usize>, json: bool) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let draws = window_of(&history, window);

    let report = PatternsReport {
        window: draws.len(),
        odd_even: analyze_odd_even(draws)?,
        high_low: analyze_high_low(draws)?,
        ranges: analyze_range_distribution(draws)?,
        consecutive: analyze_consecutive(draws),
        ac: analyze_ac_distribution(draws),
    };

    if json {
        return print_json(&report);
    }
    display_patterns(
        &report.odd_even,
        &report.high_low,
        &report.ranges,
        &report.consecutive,
        &report.ac,
        report.window,
    );
    Ok(())
}

fn cmd_hot(conn: &Connection, weeks: usize, top: usize, json: bool) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let hot = recent_hot_numbers(&history, weeks, top);
    if json {
        return print_json(&hot);
    }
    display_recent_hot(&hot, weeks.min(history.len()));
    Ok(())
}

fn cmd_cold(conn: &Connection, weeks: usize, json: bool) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let cold = recent_cold_numbers(&history, weeks);
    if json {
        return print_json(&cold);
    }
    display_recent_cold(&cold, weeks.min(history.len()));
    Ok(())
}

fn cmd_absence(conn: &Connection, top: usize, json: bool) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let mut records = absence_period(&history)?;
    records.truncate(top);
    if json {
        return print_json(&records);
    }
    display_absence(&records);
    Ok(())
}

fn cmd_monthly(conn: &Connection, months: usize, json: bool) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let mut by_month = analyze_by_month(&history);
    while by_month.len() > months {
        by_month.pop_first();
    }
    if json {
        return print_json(&by_month);
    }
    display_monthly(&by_month, 6);
    Ok(())
}

fn cmd_yearly(conn: &Connection, json: bool) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let yearly = yearly_hot_numbers(&history);
    if json {
        return print_json(&yearly);
    }
    display_yearly(&yearly);
    Ok(())
}

fn cmd_trend(conn: &Connection, weeks: usize, top: usize, json: bool) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let mut trends = analyze_trend(&history, weeks)?;
    trends.truncate(top);
    if json {
        return print_json(&trends);
    }
    display_trend(&trends, weeks.min(history.len()));
    Ok(())
}

#[derive(Serialize)]
struct Recommendation {
    strategy: Strategy,
    numbers: [u8; PICK_COUNT],
    profile: lotto645_analysis::patterns::CombinationProfile,
}

fn cmd_recommend(conn: &Connection, strategy: &str, count: usize, seed: Option<u64>, json: bool) -> Result<()> {
    let strategy = Strategy::from_tag(Some(strategy));
    // random et balanced n'ont pas besoin d'historique
    let history = match strategy {
        Strategy::Frequency | Strategy::Cold => match load_history(conn)? {
            Some(history) => history,
            None => return Ok(()),
        },
        Strategy::Balanced | Strategy::Random => DrawHistory::new(fetch_all_draws(conn)?),
    };

    let mut rng = rng_from_seed(seed);
    let mut grids = Vec::with_capacity(count);
    for _ in 0..count {
        let combination = generate_recommendation(&history, strategy, &mut rng)?;
        grids.push((combination, profile_combination(&combination)));
    }

    if json {
        let out: Vec<Recommendation> = grids
            .into_iter()
            .map(|(numbers, profile)| Recommendation { strategy, numbers, profile })
            .collect();
        return print_json(&out);
    }
    display_recommendations(strategy, &grids);
    Ok(())
}

fn cmd_check(conn: &Connection, numbers: &[u8], json: bool) -> Result<()> {
    let grid: [u8; PICK_COUNT] = numbers
        .try_into()
        .map_err(|_| anyhow::anyhow!("Entrez exactement {} numéros ({} reçus)", PICK_COUNT, numbers.len()))?;
    // le bonus n'est pas pertinent ici : on valide avec un bonus hors grille
    let free_bonus = (1..=45).find(|n| !grid.contains(n)).unwrap_or(1);
    validate_draw(&grid, free_bonus)?;

    let profile = profile_combination(&grid);
    let history = DrawHistory::new(fetch_all_draws(conn)?);
    let report = check_report(&history, profile)?;

    if json {
        return print_json(&report);
    }
    display_profile(&report.profile, report.odd_even_share, report.ac_share);
    Ok(())
}

#[derive(Serialize)]
struct CheckReport {
    profile: lotto645_analysis::patterns::CombinationProfile,
    /// % des tirages ayant la même répartition impairs:pairs
    odd_even_share: Option<u32>,
    /// % des tirages ayant la même valeur AC
    ac_share: Option<u32>,
}

/// Situe une grille dans l'historique ; parts à `None` si l'historique est vide.
fn check_report(draws: &[Draw], profile: lotto645_analysis::patterns::CombinationProfile) -> Result<CheckReport> {
    if draws.is_empty() {
        return Ok(CheckReport { profile, odd_even_share: None, ac_share: None });
    }

    let total = draws.len() as f64;
    let odd_even = analyze_odd_even(draws)?;
    let key = format!("{}:{}", profile.odd, profile.even);
    let same_split = odd_even.distribution.get(&key).copied().unwrap_or(0);
    let same_ac = analyze_ac_distribution(draws).get(&profile.ac).copied().unwrap_or(0);

    Ok(CheckReport {
        odd_even_share: Some((same_split as f64 / total * 100.0).round() as u32),
        ac_share: Some((same_ac as f64 / total * 100.0).round() as u32),
        profile,
    })
}

fn cmd_add(conn: &Connection) -> Result<()> {
    println!("Ajout d'un tirage manuellement\n");

    let history = DrawHistory::new(fetch_all_draws(conn)?);
    let next_round = history.latest_round().map_or(1, |r| r + 1);

    let round_input = prompt(&format!("Numéro du tirage [{}] : ", next_round))?;
    let round = if round_input.is_empty() {
        next_round
    } else {
        round_input.parse::<u32>().context("Numéro de tirage invalide")?
    };

    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    let date_input = prompt(&format!("Date (AAAA-MM-JJ) [{}] : ", today))?;
    let date = if date_input.is_empty() { today } else { date_input };
    validate_date(&date)?;

    let numbers = prompt_numbers()?;
    let bonus = prompt_bonus(&numbers)?;
    validate_draw(&numbers, bonus)?;

    let draw = Draw { round, date, numbers, bonus };

    // refuse un tirage antérieur ou égal au dernier connu
    let updated = history.append(draw.clone())?;

    println!("\nTirage à insérer :");
    display_draws(std::slice::from_ref(&draw));

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        let inserted = insert_draw(conn, &draw)?;
        if inserted {
            println!("Tirage inséré avec succès ({} tirages).", updated.len());
        } else {
            println!("Ce tirage existe déjà (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

fn prompt_numbers() -> Result<[u8; PICK_COUNT]> {
    loop {
        let input = prompt("6 numéros (séparés par des espaces, 1-45) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == PICK_COUNT => {
                let arr = [v[0], v[1], v[2], v[3], v[4], v[5]];
                let free_bonus = (1..=45).find(|n| !arr.contains(n)).unwrap_or(1);
                if validate_draw(&arr, free_bonus).is_ok() {
                    return Ok(arr);
                }
                println!("Numéros invalides (1-45, pas de doublons). Réessayez.");
            }
            _ => println!("Entrez exactement 6 numéros. Réessayez."),
        }
    }
}

fn prompt_bonus(numbers: &[u8; PICK_COUNT]) -> Result<u8> {
    loop {
        let input = prompt("Numéro bonus (1-45) : ")?;
        match input.parse::<u8>() {
            Ok(b) if validate_draw(numbers, b).is_ok() => return Ok(b),
            Ok(_) => println!("Bonus invalide (1-45, absent des 6 numéros). Réessayez."),
            Err(_) => bail!("Bonus illisible : '{}'", input),
        }
    }
}
