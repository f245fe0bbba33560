//! Drives the degradation engine across a simulated operating day.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    engine::{DegradationEngine, SimulationContext},
    error::{SimError, SimResult},
    flights::FlightSampler,
    record::RunwayRecord,
    rng::Stream,
    weather::{Season, WeatherModel},
};

fn default_start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 5)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn default_interval_minutes() -> i64 {
    30
}

fn default_duration_hours() -> i64 {
    24
}

fn default_jitter_minutes() -> i64 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_start_time")]
    pub start_time: NaiveDateTime,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: i64,
    #[serde(default = "default_duration_hours")]
    pub duration_hours: i64,
    /// Clock jitter is drawn from `[-jitter_minutes, jitter_minutes]`.
    #[serde(default = "default_jitter_minutes")]
    pub jitter_minutes: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            interval_minutes: default_interval_minutes(),
            duration_hours: default_duration_hours(),
            jitter_minutes: default_jitter_minutes(),
        }
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> SimResult<()> {
        check_interval(self.interval_minutes, self.jitter_minutes)?;
        let duration = self.duration()?;
        window_end(self.start_time, duration)?;
        Ok(())
    }

    fn duration(&self) -> SimResult<Duration> {
        if self.duration_hours <= 0 {
            return Err(SimError::InvalidDuration);
        }
        Duration::try_hours(self.duration_hours).ok_or(SimError::ScheduleOutOfRange {
            field: "duration_hours",
            value: self.duration_hours,
        })
    }
}

/// The shortest gap must stay positive and the longest must fit a `Duration`.
fn check_interval(interval_minutes: i64, jitter_minutes: i64) -> SimResult<()> {
    let shortest = interval_minutes.checked_sub(jitter_minutes);
    if jitter_minutes < 0 || shortest.map_or(true, |gap| gap <= 0) {
        return Err(SimError::NonPositiveInterval {
            interval_minutes,
            jitter_minutes,
        });
    }
    step(interval_minutes, jitter_minutes).map(|_| ())
}

fn step(interval_minutes: i64, jitter: i64) -> SimResult<Duration> {
    interval_minutes
        .checked_add(jitter)
        .and_then(Duration::try_minutes)
        .ok_or(SimError::ScheduleOutOfRange {
            field: "interval_minutes",
            value: interval_minutes,
        })
}

fn window_end(start_time: NaiveDateTime, duration: Duration) -> SimResult<NaiveDateTime> {
    start_time
        .checked_add_signed(duration)
        .ok_or(SimError::ScheduleOutOfRange {
            field: "duration_hours",
            value: duration.num_hours(),
        })
}

pub struct DayScheduler {
    sampler: FlightSampler,
    weather: WeatherModel,
    engine: DegradationEngine,
    duration: Duration,
    jitter_minutes: i64,
}

impl DayScheduler {
    pub fn new(
        sampler: FlightSampler,
        weather: WeatherModel,
        engine: DegradationEngine,
        schedule: &ScheduleConfig,
    ) -> SimResult<Self> {
        schedule.validate()?;
        Ok(Self {
            sampler,
            weather,
            engine,
            duration: schedule.duration()?,
            jitter_minutes: schedule.jitter_minutes,
        })
    }

    pub fn engine(&self) -> &DegradationEngine {
        &self.engine
    }

    /// Simulates one window starting at `start_time`, records in clock order.
    pub fn simulate_run(
        &self,
        ctx: &mut SimulationContext,
        start_time: NaiveDateTime,
        interval_minutes: i64,
    ) -> SimResult<Vec<RunwayRecord>> {
        let mut records = Vec::new();
        self.run_with_hook(ctx, start_time, interval_minutes, |record| {
            records.push(record.clone())
        })?;
        Ok(records)
    }

    /// Like [`simulate_run`](Self::simulate_run) but hands each record to
    /// `hook` as soon as it is produced.
    pub fn run_with_hook<F>(
        &self,
        ctx: &mut SimulationContext,
        start_time: NaiveDateTime,
        interval_minutes: i64,
        mut hook: F,
    ) -> SimResult<usize>
    where
        F: FnMut(&RunwayRecord),
    {
        check_interval(interval_minutes, self.jitter_minutes)?;
        let end_time = window_end(start_time, self.duration)?;
        tracing::info!(
            seed = ctx.rng.seed(),
            %start_time,
            %end_time,
            interval_minutes,
            zones = ctx.zones.len(),
            "starting simulated window"
        );

        let mut current_time = start_time;
        let mut ticks = 0usize;
        let mut anomalies = 0usize;
        while current_time < end_time {
            let event = self.sampler.next_event(ctx.rng.stream(Stream::Flights));
            let season = Season::of(&current_time)?;
            let weather = self
                .weather
                .sample(season, ctx.rng.stream(Stream::Weather));
            let record = self.engine.apply(ctx, current_time, &event, &weather)?;

            tracing::debug!(
                tick = ticks,
                timestamp = %record.timestamp,
                zone = record.zone,
                aircraft = %record.aircraft,
                anomaly = record.anomaly,
                "flight processed"
            );
            ticks += 1;
            anomalies += usize::from(record.anomaly);
            hook(&record);

            let jitter = ctx
                .rng
                .stream(Stream::Schedule)
                .gen_range(-self.jitter_minutes..=self.jitter_minutes);
            match current_time.checked_add_signed(step(interval_minutes, jitter)?) {
                Some(next) => current_time = next,
                // past the last representable instant, so past the window too
                None => break,
            }
        }

        tracing::info!(records = ticks, anomalies, "simulated window complete");
        Ok(ticks)
    }
}
