#[cfg(test)]
use tokio::sync::watch;
use tokio::time::{Duration, Instant};

/// Time source for the failure detector's loop, mockable so liveness tests
/// can advance time deterministically.
#[async_trait::async_trait]
pub(crate) trait Clock: Clone {
    fn now(&self) -> Instant;
    async fn sleep_until(&mut self, deadline: Instant);

    async fn sleep(&mut self, duration: Duration) {
        let deadline = self.now() + duration;
        self.sleep_until(deadline).await;
    }
}

#[derive(Copy, Clone)]
pub(crate) struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&mut self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}

#[cfg(test)]
pub(crate) fn mocked_clock() -> (MockClock, MockClockController) {
    let now = Instant::now();
    let (tx, rx) = watch::channel(now);

    (
        MockClock {
            current_time: rx,
            next_deadline: now,
        },
        MockClockController { current_time: tx },
    )
}

#[cfg(test)]
#[derive(Clone)]
pub(crate) struct MockClock {
    current_time: watch::Receiver<Instant>,
    next_deadline: Instant,
}

#[cfg(test)]
#[async_trait::async_trait]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current_time.borrow()
    }

    async fn sleep_until(&mut self, deadline: Instant) {
        loop {
            if *self.current_time.borrow() >= deadline {
                return;
            }

            self.current_time.changed().await.expect("clock controller dropped");
        }
    }

    /// Sleep against an absolute schedule anchored at the clock's creation,
    /// so advances issued before the sleeper's task is first polled are not
    /// silently folded into the next deadline and lost.
    async fn sleep(&mut self, duration: Duration) {
        self.next_deadline += duration;
        let deadline = self.next_deadline;
        self.sleep_until(deadline).await;
    }
}

#[cfg(test)]
pub(crate) struct MockClockController {
    current_time: watch::Sender<Instant>,
}

#[cfg(test)]
impl MockClockController {
    /// Advance in increments no larger than the granularity you want to
    /// observe; a sleeping task only promises to wake once `now` is at or
    /// past its deadline.
    pub(crate) fn advance(&mut self, duration: Duration) {
        let new_now = *self.current_time.borrow() + duration;
        self.current_time.send(new_now).expect("mock clock dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn mock_clock_wakes_sleepers_when_advanced() {
        let tick = Duration::from_millis(500);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (mut clock, mut controller) = mocked_clock();

        let start = clock.now();
        tokio::spawn(async move {
            let mut next_wake = start;
            loop {
                next_wake += tick;
                clock.sleep_until(next_wake).await;
                tx.send(()).expect("receiver shouldn't drop");
            }
        });

        tokio::time::timeout(tick, rx.recv()).await.expect_err("no tick yet");

        controller.advance(tick);
        rx.recv().await.unwrap();

        controller.advance(tick * 2);
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();
        tokio::time::timeout(tick, rx.recv()).await.expect_err("caught up");
    }
}
