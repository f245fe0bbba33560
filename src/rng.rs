use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Independent random streams consumed by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Initial per-zone rubber and crack values.
    Zones,
    /// Flight ids, aircraft picks and zone assignment.
    Flights,
    Weather,
    /// Per-event wear draws.
    Degradation,
    /// Clock jitter between ticks.
    Schedule,
}

impl Stream {
    pub const COUNT: usize = 5;

    pub const ALL: [Stream; Stream::COUNT] = [
        Stream::Zones,
        Stream::Flights,
        Stream::Weather,
        Stream::Degradation,
        Stream::Schedule,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Seeded generators, one ChaCha stream per [`Stream`].
///
/// Every stream shares the run seed and differs only in its ChaCha stream
/// id, so draws on one stream never shift another regardless of call order.
pub struct RngManager {
    seed: u64,
    streams: [ChaCha8Rng; Stream::COUNT],
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        let streams = Stream::ALL.map(|stream| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(stream.index() as u64);
            rng
        });
        Self { seed, streams }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stream(&mut self, stream: Stream) -> &mut ChaCha8Rng {
        &mut self.streams[stream.index()]
    }
}
