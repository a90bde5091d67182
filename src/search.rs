use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::geocode::{GeocodeError, GeocodedPlace, Geocoder};
use crate::map_view::MapSurface;
use crate::toast::Notifier;

pub const LOCATION_NOT_FOUND: &str = "Location not found";
pub const GEOCODING_FAILED: &str = "Geocoding failed";

#[derive(Debug)]
pub enum SearchOutcome {
    Found(GeocodedPlace),
    NotFound,
    Failed(GeocodeError),
}

impl From<Result<Option<GeocodedPlace>, GeocodeError>> for SearchOutcome {
    fn from(result: Result<Option<GeocodedPlace>, GeocodeError>) -> Self {
        match result {
            Ok(Some(place)) => SearchOutcome::Found(place),
            Ok(None) => SearchOutcome::NotFound,
            Err(err) => SearchOutcome::Failed(err),
        }
    }
}

type Wake = Arc<dyn Fn() + Send + Sync>;

/// Runs geocoding lookups off the UI thread.
///
/// Every submitted query gets a sequence number; only the outcome of the
/// most recent one is handed back by [`LocationSearch::poll`].
pub struct LocationSearch {
    geocoder: Arc<dyn Geocoder>,
    tx: Sender<(u64, SearchOutcome)>,
    rx: Receiver<(u64, SearchOutcome)>,
    latest: u64,
    /// Query of the lookup whose result has not been applied yet.
    pending: Option<String>,
    wake: Option<Wake>,
}

impl LocationSearch {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            geocoder,
            tx,
            rx,
            latest: 0,
            pending: None,
            wake: None,
        }
    }

    /// Called from the worker once a result has been sent, so an idle UI
    /// repaints and picks it up.
    pub fn with_wake(mut self, wake: impl Fn() + Send + Sync + 'static) -> Self {
        self.wake = Some(Arc::new(wake));
        self
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a lookup. Returns false without contacting the geocoder for
    /// blank queries and for a repeat of the query still in flight.
    pub fn submit(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        if self.pending.as_deref() == Some(query) {
            tracing::debug!(query, "lookup already in flight");
            return false;
        }

        self.latest += 1;
        let id = self.latest;
        let query = query.to_string();
        self.pending = Some(query.clone());
        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.tx.clone();
        let wake = self.wake.clone();

        tracing::info!(id, query = %query, "geocoding");
        thread::spawn(move || {
            let outcome = SearchOutcome::from(geocoder.locate(&query));
            // The receiver only goes away with the screen.
            if tx.send((id, outcome)).is_ok() {
                if let Some(wake) = wake {
                    wake();
                }
            }
        });
        true
    }

    /// Returns the outcome of the latest query once it has arrived.
    pub fn poll(&mut self) -> Option<SearchOutcome> {
        let mut latest = None;
        while let Ok((id, outcome)) = self.rx.try_recv() {
            latest = self.accept(id, outcome).or(latest);
        }
        latest
    }

    #[cfg(test)]
    fn wait(&mut self, timeout: std::time::Duration) -> Option<SearchOutcome> {
        let deadline = std::time::Instant::now() + timeout;
        while self.pending.is_some() {
            let remaining = deadline.checked_duration_since(std::time::Instant::now())?;
            let (id, outcome) = self.rx.recv_timeout(remaining).ok()?;
            if let Some(outcome) = self.accept(id, outcome) {
                return Some(outcome);
            }
        }
        None
    }

    fn accept(&mut self, id: u64, outcome: SearchOutcome) -> Option<SearchOutcome> {
        if id != self.latest {
            tracing::debug!(id, latest = self.latest, "discarding stale geocoding result");
            return None;
        }
        self.pending = None;
        Some(outcome)
    }
}

/// Applies a finished lookup: recenter on a match, otherwise tell the user
/// and leave the map alone.
pub fn apply_outcome<M, N>(outcome: SearchOutcome, map: &mut M, notifier: &mut N)
where
    M: MapSurface + ?Sized,
    N: Notifier + ?Sized,
{
    match outcome {
        SearchOutcome::Found(place) => {
            tracing::info!(point = %place.point, name = %place.display_name, "location found");
            map.animate_to(place.point);
        }
        SearchOutcome::NotFound => {
            tracing::info!("no geocoding match");
            notifier.notify(LOCATION_NOT_FOUND);
        }
        SearchOutcome::Failed(err) => {
            tracing::warn!(error = %err, "geocoding failed");
            notifier.notify(GEOCODING_FAILED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::map_view::MapView;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const NEW_YORK: GeoPoint = GeoPoint::new(40.7128, -74.0060);
    const TIMEOUT: Duration = Duration::from_secs(5);

    #[derive(Default)]
    struct FakeGeocoder {
        places: HashMap<String, GeoPoint>,
        calls: AtomicUsize,
    }

    impl FakeGeocoder {
        fn with(mut self, query: &str, point: GeoPoint) -> Self {
            self.places.insert(query.to_string(), point);
            self
        }
    }

    impl Geocoder for FakeGeocoder {
        fn locate(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query == "offline" {
                return Err(GeocodeError::UnexpectedStatus {
                    status: 503,
                    url: "http://geocoder.test/search".to_string(),
                });
            }
            Ok(self.places.get(query).map(|point| GeocodedPlace {
                point: *point,
                display_name: query.to_string(),
            }))
        }
    }

    /// Blocks each lookup until released, so ordering can be forced.
    struct GatedGeocoder {
        gates: Mutex<HashMap<String, mpsc::Receiver<()>>>,
    }

    impl Geocoder for GatedGeocoder {
        fn locate(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
            let gate = self.gates.lock().unwrap().remove(query);
            if let Some(gate) = gate {
                let _ = gate.recv();
            }
            Ok(Some(GeocodedPlace {
                point: GeoPoint::new(query.len() as f64, 0.0),
                display_name: query.to_string(),
            }))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier(Vec<String>);

    impl Notifier for RecordingNotifier {
        fn notify(&mut self, text: &str) {
            self.0.push(text.to_string());
        }
    }

    fn settle(map: &mut MapView) {
        while map.tick(Duration::from_millis(250)) {}
    }

    #[test]
    fn blank_query_never_reaches_the_geocoder() {
        let geocoder = Arc::new(FakeGeocoder::default());
        let mut search = LocationSearch::new(geocoder.clone());

        assert!(!search.submit(""));
        assert!(!search.submit("   \t\n"));
        assert!(!search.is_pending());
        assert!(search.poll().is_none());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn repeated_query_waits_for_the_lookup_in_flight() {
        let geocoder = Arc::new(FakeGeocoder::default());
        let mut search = LocationSearch::new(geocoder.clone());

        assert!(search.submit("Rome"));
        assert!(!search.submit(" Rome "));
        assert!(search.is_pending());
        search.wait(TIMEOUT).expect("lookup finished");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);

        assert!(search.submit("Rome"));
        search.wait(TIMEOUT).expect("second lookup finished");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn match_recenters_the_map() {
        let tokyo = GeoPoint::new(35.6762, 139.6503);
        let geocoder = Arc::new(FakeGeocoder::default().with("Tokyo", tokyo));
        let mut search = LocationSearch::new(geocoder);
        let mut map = MapView::new(NEW_YORK, 10.0);
        let mut notifier = RecordingNotifier::default();

        assert!(search.submit("  Tokyo "));
        let outcome = search.wait(TIMEOUT).expect("lookup finished");
        apply_outcome(outcome, &mut map, &mut notifier);
        settle(&mut map);

        assert!((map.center().latitude - tokyo.latitude).abs() < 1e-9);
        assert!((map.center().longitude - tokyo.longitude).abs() < 1e-9);
        assert!(notifier.0.is_empty());
    }

    #[test]
    fn no_match_notifies_and_keeps_center() {
        let mut search = LocationSearch::new(Arc::new(FakeGeocoder::default()));
        let mut map = MapView::new(NEW_YORK, 10.0);
        let mut notifier = RecordingNotifier::default();

        search.submit("Atlantis");
        let outcome = search.wait(TIMEOUT).expect("lookup finished");
        assert!(matches!(outcome, SearchOutcome::NotFound));
        apply_outcome(outcome, &mut map, &mut notifier);
        settle(&mut map);

        assert_eq!(map.center(), NEW_YORK);
        assert_eq!(notifier.0, vec![LOCATION_NOT_FOUND.to_string()]);
    }

    #[test]
    fn failure_notifies_and_keeps_center() {
        let mut search = LocationSearch::new(Arc::new(FakeGeocoder::default()));
        let mut map = MapView::new(NEW_YORK, 10.0);
        let mut notifier = RecordingNotifier::default();

        search.submit("offline");
        let outcome = search.wait(TIMEOUT).expect("lookup finished");
        assert!(matches!(outcome, SearchOutcome::Failed(_)));
        apply_outcome(outcome, &mut map, &mut notifier);
        settle(&mut map);

        assert_eq!(map.center(), NEW_YORK);
        assert_eq!(notifier.0, vec![GEOCODING_FAILED.to_string()]);
        assert!(!search.is_pending());
    }

    #[test]
    fn stale_results_are_discarded() {
        let (release_slow, slow_gate) = mpsc::channel();
        let gates = HashMap::from([("slow query".to_string(), slow_gate)]);
        let geocoder = Arc::new(GatedGeocoder {
            gates: Mutex::new(gates),
        });
        let mut search = LocationSearch::new(geocoder);

        search.submit("slow query");
        search.submit("fast");
        let outcome = search.wait(TIMEOUT).expect("latest lookup finished");
        match outcome {
            SearchOutcome::Found(place) => assert_eq!(place.display_name, "fast"),
            other => panic!("unexpected outcome: {other:?}"),
        }

        release_slow.send(()).unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(search.poll().is_none());
    }

    #[test]
    fn worker_wakes_the_ui() {
        let woken = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&woken);
        let mut search = LocationSearch::new(Arc::new(FakeGeocoder::default()))
            .with_wake(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        search.submit("anywhere");
        search.wait(TIMEOUT).expect("lookup finished");
        // The wake call follows the send; give the worker a moment.
        for _ in 0..50 {
            if woken.load(Ordering::SeqCst) == 1 {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(woken.load(Ordering::SeqCst), 1);
    }
}
