use crate::{App, CounterSnapshot, Counters, Result, Shuffle};
use log::{debug, info};
use rayon::{prelude::*, ThreadPoolBuilder};

/// Output records and counter totals of one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOutput {
    pub records: Vec<String>,
    pub counters: CounterSnapshot,
}

/// Drives an [`App`] over a batch of records: map, shuffle, reduce.
#[derive(Debug)]
pub struct Pipeline<'a, A: App + ?Sized> {
    app: &'a A,
    threads: usize,
}

impl<'a, A: App + ?Sized> Pipeline<'a, A> {
    pub fn new(app: &'a A) -> Self {
        Self { app, threads: 0 }
    }

    /// Worker threads for both phases; `0` picks one per CPU.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn run(&self, records: Vec<String>) -> Result<JobOutput> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?;
        Ok(pool.install(|| self.run_in_pool(records)))
    }

    fn run_in_pool(&self, records: Vec<String>) -> JobOutput {
        let app = self.app;
        let n_records = records.len();

        let shuffle = records
            .par_iter()
            .fold(Shuffle::new, |mut shuffle, record| {
                shuffle.extend(app.map(record));
                shuffle
            })
            .reduce(Shuffle::new, Shuffle::merge);
        info!("map done: {} records, {} keys", n_records, shuffle.len());

        let counters = Counters::new();
        let records = shuffle
            .into_groups()
            .into_par_iter()
            .flat_map_iter(|group| {
                debug_assert!(!group.values.is_empty(), "empty group: {}", group.key);
                debug!("reduce {} ({} values)", group.key, group.values.len());
                app.reduce(&group.key, group.values, &counters)
            })
            .collect::<Vec<_>>();
        info!("reduce done: {} output records", records.len());

        JobOutput {
            records,
            counters: counters.snapshot(),
        }
    }
}
