use std::collections::BTreeMap;

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use crate::import::ImportResult;
use lotto645_analysis::DatasetOverview;
use lotto645_analysis::frequency::{FrequencyStats, NumberCount};
use lotto645_analysis::patterns::{
    CombinationProfile, ConsecutiveDistribution, ConsecutivePattern, HighLowAnalysis,
    OddEvenAnalysis, RangeBucket,
};
use lotto645_analysis::recommend::{Combination, Strategy};
use lotto645_analysis::timeline::{AbsenceRecord, NumberTrend, PeriodFrequency, TrendDirection};
use lotto645_db::models::Draw;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Couleur de boule officielle par tranche.
fn ball_color(n: u8) -> Color {
    match n {
        0..=10 => Color::Yellow,
        11..=20 => Color::Blue,
        21..=30 => Color::Red,
        31..=40 => Color::Grey,
        _ => Color::Green,
    }
}

fn ball_cell(n: u8) -> Cell {
    Cell::new(format!("{:2}", n)).fg(ball_color(n))
}

fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn format_hot(counts: &[NumberCount]) -> String {
    counts
        .iter()
        .map(|c| format!("{} ({})", c.number, c.count))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn display_overview(overview: &DatasetOverview) {
    println!(
        "\n📅 {} tirages — n°{} à n°{} ({} ~ {})",
        overview.total_draws,
        overview.first_round,
        overview.latest_round,
        overview.first_month,
        overview.latest_month
    );
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Tirage", "Date", "Numéros", "Bonus"]);

    for draw in draws {
        table.add_row(vec![
            Cell::new(draw.round),
            Cell::new(&draw.date),
            Cell::new(format_numbers(&draw.sorted_numbers())),
            ball_cell(draw.bonus),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total tirages lus : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_frequency(sorted: &[NumberCount], stats: &FrequencyStats, window: usize, with_bonus: bool) {
    let scope = if with_bonus { "numéros + bonus" } else { "numéros" };
    println!("\n📊 Fréquences sur les {} derniers tirages ({})\n", window, scope);
    println!(
        "  min {} · max {} · moyenne {} · médiane {}\n",
        stats.min, stats.max, stats.avg, stats.median
    );

    let mut table = new_table(vec!["Numéro", "Apparitions"]);
    for c in sorted {
        table.add_row(vec![ball_cell(c.number), Cell::new(c.count)]);
    }
    println!("{table}");
}

pub fn display_hot_cold(hot: &[NumberCount], cold: &[NumberCount]) {
    println!("\n🔥 Chauds : {}", format_hot(hot));
    println!("🧊 Froids : {}", format_hot(cold));
}

pub fn display_patterns(
    odd_even: &OddEvenAnalysis,
    high_low: &HighLowAnalysis,
    ranges: &[RangeBucket],
    consecutive: &ConsecutiveDistribution,
    ac: &BTreeMap<u8, u32>,
    window: usize,
) {
    println!("\n🧩 Motifs sur les {} derniers tirages\n", window);

    println!(
        "── Pair / impair : {}% impairs, {}% pairs ──",
        odd_even.odd_percent, odd_even.even_percent
    );
    display_distribution("Impairs:Pairs", &odd_even.distribution);

    println!(
        "\n── Bas / haut (≤22 / ≥23) : {}% bas, {}% hauts ──",
        high_low.low_percent, high_low.high_percent
    );
    display_distribution("Bas:Hauts", &high_low.distribution);

    println!("\n── Tranches ──");
    let mut table = new_table(vec!["Tranche", "Numéros tirés", "%"]);
    for bucket in ranges {
        table.add_row(vec![
            Cell::new(&bucket.range),
            Cell::new(bucket.count),
            Cell::new(format!("{}%", bucket.percent)),
        ]);
    }
    println!("{table}");

    println!("\n── Numéros consécutifs ──");
    let mut table = new_table(vec!["Motif", "Tirages", "%"]);
    for pattern in ConsecutivePattern::ALL {
        let percent = consecutive
            .percent(pattern)
            .map(|p| format!("{}%", p))
            .unwrap_or_else(|_| "—".to_string());
        table.add_row(vec![
            Cell::new(pattern.to_string()),
            Cell::new(consecutive.count(pattern)),
            Cell::new(percent),
        ]);
    }
    println!("{table}");

    println!("\n── Valeur AC ──");
    let mut table = new_table(vec!["AC", "Tirages"]);
    for (value, count) in ac {
        table.add_row(vec![Cell::new(value), Cell::new(count)]);
    }
    println!("{table}");
}

fn display_distribution(label: &str, distribution: &BTreeMap<String, u32>) {
    let mut table = new_table(vec![label, "Tirages"]);
    for (key, count) in distribution {
        table.add_row(vec![Cell::new(key), Cell::new(count)]);
    }
    println!("{table}");
}

pub fn display_recent_hot(hot: &[NumberCount], weeks: usize) {
    println!("\n🔥 Numéros chauds sur les {} derniers tirages\n", weeks);
    let mut table = new_table(vec!["Numéro", "Apparitions"]);
    for c in hot {
        table.add_row(vec![ball_cell(c.number), Cell::new(c.count)]);
    }
    println!("{table}");
}

pub fn display_recent_cold(cold: &[u8], weeks: usize) {
    println!("\n🧊 Numéros absents des {} derniers tirages ({})\n", weeks, cold.len());
    if cold.is_empty() {
        println!("Tous les numéros sont sortis.");
    } else {
        println!("  {}", format_numbers(cold));
    }
}

pub fn display_absence(records: &[AbsenceRecord]) {
    println!("\n⏳ Retards\n");
    let mut table = new_table(vec!["Numéro", "Dernier tirage", "Retard"]);
    for r in records {
        let last = if r.last_round == 0 {
            "jamais".to_string()
        } else {
            r.last_round.to_string()
        };
        table.add_row(vec![ball_cell(r.number), Cell::new(last), Cell::new(r.absence)]);
    }
    println!("{table}");
}

pub fn display_monthly(months: &BTreeMap<String, PeriodFrequency>, top: usize) {
    println!("\n🗓  Fréquences mensuelles\n");
    let mut table = new_table(vec!["Mois", "Tirages", "Numéros les plus sortis"]);
    for (month, period) in months {
        let mut counts: Vec<NumberCount> = period.frequency.iter().filter(|c| c.count > 0).collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));
        counts.truncate(top);
        table.add_row(vec![
            Cell::new(month),
            Cell::new(period.rounds.len()),
            Cell::new(format_hot(&counts)),
        ]);
    }
    println!("{table}");
}

pub fn display_yearly(years: &BTreeMap<String, Vec<NumberCount>>) {
    println!("\n📆 Numéros chauds par année\n");
    let mut table = new_table(vec!["Année", "Top 6"]);
    for (year, hot) in years {
        table.add_row(vec![Cell::new(year), Cell::new(format_hot(hot))]);
    }
    println!("{table}");
}

pub fn display_trend(trends: &[NumberTrend], weeks: usize) {
    println!("\n📈 Tendance des {} derniers tirages contre l'historique\n", weeks);
    let mut table = new_table(vec!["Numéro", "Global", "Récent", "Écart/tirage", "Tendance"]);
    for t in trends {
        let color = match t.trend {
            TrendDirection::Up => Color::Green,
            TrendDirection::Down => Color::Red,
            TrendDirection::Stable => Color::White,
        };
        table.add_row(vec![
            ball_cell(t.number),
            Cell::new(t.all_freq),
            Cell::new(t.recent_freq),
            Cell::new(format!("{:+.4}", t.trend_value)),
            Cell::new(t.trend.to_string()).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_recommendations(strategy: Strategy, grids: &[(Combination, CombinationProfile)]) {
    println!("\n🎲 Suggestions ({})\n", strategy);

    let mut table = new_table(vec!["#", "Numéros", "Impairs:Pairs", "Bas:Hauts", "Somme", "AC", "Suites"]);
    for (i, (combination, profile)) in grids.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format_numbers(combination)),
            Cell::new(format!("{}:{}", profile.odd, profile.even)),
            Cell::new(format!("{}:{}", profile.low, profile.high)),
            Cell::new(profile.sum),
            Cell::new(profile.ac),
            Cell::new(profile.consecutive.to_string()),
        ]);
    }
    println!("{table}");
}

pub fn display_profile(profile: &CombinationProfile, odd_even_share: Option<u32>, ac_share: Option<u32>) {
    println!("\n🔎 Grille {}\n", format_numbers(&profile.numbers));

    let share = |s: Option<u32>| s.map(|p| format!("{}% des tirages", p)).unwrap_or_else(|| "—".to_string());

    let mut table = new_table(vec!["Critère", "Valeur", "Historique"]);
    table.add_row(vec![
        Cell::new("Impairs:Pairs"),
        Cell::new(format!("{}:{}", profile.odd, profile.even)),
        Cell::new(share(odd_even_share)),
    ]);
    table.add_row(vec![
        Cell::new("Bas:Hauts"),
        Cell::new(format!("{}:{}", profile.low, profile.high)),
        Cell::new("—"),
    ]);
    table.add_row(vec![Cell::new("Somme"), Cell::new(profile.sum), Cell::new("—")]);
    table.add_row(vec![Cell::new("Valeur AC"), Cell::new(profile.ac), Cell::new(share(ac_share))]);
    table.add_row(vec![
        Cell::new("Suites"),
        Cell::new(profile.consecutive.to_string()),
        Cell::new("—"),
    ]);
    println!("{table}");
}
