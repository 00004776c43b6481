//! Job and game history.
//!
//! Jobs (`jobs.json`) and games (`games.json`) are authored separately; a
//! game belongs to every job whose `company` equals the game's `job` field.
//! The join, the dates and the platform list are derived on every build and
//! never written back.
//!
//! Dates:
//! - job `start` is `"2015 March"`; unparseable starts are logged and the
//!   job sorts after every dated one;
//! - game `released` is `"07 June 2019"`; an empty value means unreleased
//!   and dates the game at build time, an unparseable one is logged and the
//!   game sorts last.

use std::collections::BTreeSet;
use std::path::Path;

use crate::dates::{self, PubDate};
use crate::loader::{self, LoadError};
use crate::ordering;
use crate::types::{GameEntry, JobEntry};

/// Jobs joined with their games, plus the flattened game list.
#[derive(Debug, Clone, Default)]
pub struct Career {
    /// Newest first, each with its games newest first.
    pub jobs: Vec<JobEntry>,
    /// Every game, newest first.
    pub games: Vec<GameEntry>,
    /// Platforms of games made at a listed job, de-duplicated and sorted.
    pub platforms: Vec<String>,
}

fn date_job(job: &mut JobEntry) {
    job.date = dates::parse_month_year(&job.start);
    if job.date.is_none() {
        spdlog::warn!("Job '{}' has unparseable start '{}'", job.company, job.start);
    }
}

fn date_game(game: &mut GameEntry, build_time: PubDate) {
    let released = game.released.trim();
    game.date = if released.is_empty() {
        Some(build_time)
    } else {
        let parsed = dates::parse_release_date(released);
        if parsed.is_none() {
            spdlog::warn!("Game '{}' has unparseable release date '{}'", game.title, released);
        }
        parsed
    };
}

/// Date everything, join games onto jobs and collect platforms.
pub fn join(mut jobs: Vec<JobEntry>, mut games: Vec<GameEntry>, build_time: PubDate) -> Career {
    for game in games.iter_mut() {
        date_game(game, build_time);
    }
    ordering::sort_games(&mut games);

    let mut platforms = BTreeSet::new();
    for job in jobs.iter_mut() {
        date_job(job);
        job.games = games
            .iter()
            .filter(|g| g.job == job.company)
            .cloned()
            .collect();
        for game in &job.games {
            platforms.extend(game.platforms.iter().cloned());
        }
    }
    ordering::sort_jobs(&mut jobs);

    for game in &games {
        if !jobs.iter().any(|j| j.company == game.job) {
            spdlog::debug!("Game '{}' matches no job ('{}')", game.title, game.job);
        }
    }

    Career {
        jobs,
        games,
        platforms: platforms.into_iter().collect(),
    }
}

/// Load `jobs.json` and `games.json` from the data directory and join them.
/// Either file may be missing.
pub fn load_career(data_dir: &Path, build_time: PubDate) -> Result<Career, LoadError> {
    let jobs: Vec<JobEntry> = loader::load_optional_json_list(&data_dir.join("jobs.json"))?;
    let games: Vec<GameEntry> = loader::load_optional_json_list(&data_dir.join("games.json"))?;
    let career = join(jobs, games, build_time);
    spdlog::info!(
        "Loaded {} jobs, {} games on {} platforms",
        career.jobs.len(),
        career.games.len(),
        career.platforms.len()
    );
    Ok(career)
}
