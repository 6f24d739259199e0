//! The recognition-and-action polling engine.
//!
//! `check_and_wait` is the suspension mechanism of the whole bot: capture
//! one frame, evaluate every remaining check pair against that same frame
//! in order, dispatch the first matching pair's actions, sleep, repeat.
//! The loop has no overall timeout; it runs until a terminating action
//! fires or the pair set is emptied.

use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::Result;
use image::RgbaImage;
use log::{debug, info, warn};

use stagebot_core::{Action, CheckPair, Match, Point, PollOptions};
use stagebot_cv::{AssetLibrary, CvError, Matcher, ScreenSource};

use crate::pointer::PointerController;

/// Target of a move-and-click: a literal coordinate, or an image resolved
/// against a fresh capture at click time.
pub enum ClickTarget<'a> {
    Point(Point),
    Image(&'a RgbaImage),
}

/// Parameters of one move-and-click.
#[derive(Clone, Copy)]
pub struct ClickOptions {
    /// Pointer travel time in seconds (0 = instantaneous).
    pub duration: f32,
    /// Sleep between arriving and clicking, letting the UI settle.
    pub pause: Duration,
    /// Park the pointer at the off-screen anchor after the click.
    pub reset: bool,
    /// Threshold used when the target is an image.
    pub similarity: f64,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            duration: 0.5,
            pause: Duration::from_secs(1),
            reset: true,
            similarity: 0.85,
        }
    }
}

impl ClickOptions {
    /// Options with no waiting at all.
    pub fn immediate() -> Self {
        Self {
            duration: 0.0,
            pause: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Engine-wide defaults, normally derived from the bot configuration.
#[derive(Clone, Copy)]
pub struct EngineDefaults {
    pub poll: PollOptions,
    pub click: ClickOptions,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            poll: PollOptions::default(),
            click: ClickOptions::default(),
        }
    }
}

impl EngineDefaults {
    /// Defaults with every sleep zeroed. Used where the caller drives the
    /// frame sequence itself.
    pub fn immediate() -> Self {
        Self {
            poll: PollOptions::immediate(),
            click: ClickOptions::immediate(),
        }
    }
}

/// The poll-and-dispatch engine plus everything it drives: matcher, screen
/// source, pointer, and the reference-image library the stages read.
pub struct Engine {
    matcher: Matcher,
    screen: Box<dyn ScreenSource>,
    pointer: PointerController,
    assets: AssetLibrary,
    defaults: EngineDefaults,
}

impl Engine {
    pub fn new(
        matcher: Matcher,
        screen: Box<dyn ScreenSource>,
        pointer: PointerController,
        assets: AssetLibrary,
        defaults: EngineDefaults,
    ) -> Self {
        Self {
            matcher,
            screen,
            pointer,
            assets,
            defaults,
        }
    }

    pub fn assets(&self) -> &AssetLibrary {
        &self.assets
    }

    pub fn poll_options(&self) -> PollOptions {
        self.defaults.poll
    }

    pub fn click_options(&self) -> ClickOptions {
        self.defaults.click
    }

    /// Move the pointer to `target` and click it.
    ///
    /// An image target is resolved against a fresh capture; zero matches is
    /// the fatal [`CvError::ImageNotFound`], more than one logs a warning
    /// and uses the first.
    pub fn move_click(&mut self, target: ClickTarget<'_>, opts: ClickOptions) -> Result<()> {
        let point = match target {
            ClickTarget::Point(point) => point,
            ClickTarget::Image(image) => {
                let frame = self.screen.grab()?;
                let results = self.matcher.find_all(image, &frame, opts.similarity)?;
                if results.is_empty() {
                    return Err(CvError::ImageNotFound("点击目标".to_string()).into());
                }
                if results.len() > 1 {
                    warn!("找到多个匹配，使用第一个");
                }
                results[0].point
            }
        };

        self.pointer.move_to(point, opts.duration)?;
        if !opts.pause.is_zero() {
            debug!("暂停 {:.1} 秒", opts.pause.as_secs_f64());
            sleep(opts.pause);
        }
        debug!("点击 ({:.0}, {:.0})", point.x, point.y);
        self.pointer.click()?;
        if opts.reset {
            self.pointer.reset_cursor()?;
        }
        Ok(())
    }

    /// Poll the screen until one of `pairs` terminates the loop.
    ///
    /// Returns the terminating pair's match list and payload, or
    /// `(vec![], None)` once the pair set has been emptied by `RemoveMe`.
    pub fn check_and_wait<T>(
        &mut self,
        pairs: Vec<CheckPair<T>>,
        opts: PollOptions,
    ) -> Result<(Vec<Match>, Option<T>)> {
        let started = Instant::now();
        debug!(
            "开始检查，相似度 {}，间隔 {:.1} 秒，{} 个检查，延迟 {:.1} 秒",
            opts.similarity,
            opts.interval.as_secs_f64(),
            pairs.len(),
            opts.delay.as_secs_f64()
        );
        sleep(opts.delay);

        let mut pairs = pairs;
        loop {
            if pairs.is_empty() {
                return Ok((Vec::new(), None));
            }
            let frame = self.screen.grab()?;

            let mut index = 0;
            while index < pairs.len() {
                let mut results =
                    self.matcher
                        .find_all(&pairs[index].image, &frame, opts.similarity)?;
                if let Some(filter) = opts.result_filter {
                    if !results.is_empty() {
                        results = filter(results);
                    }
                }
                if results.is_empty() {
                    index += 1;
                    continue;
                }

                if let Some(message) = &pairs[index].log {
                    info!("{message}");
                }

                let name = pairs[index].name.clone();
                if pairs[index].actions.is_empty() {
                    debug!(
                        "已找到 {}，等候耗时 {:.2} 秒",
                        name,
                        started.elapsed().as_secs_f64()
                    );
                    let payload = pairs[index].returns.take();
                    return Ok((results, payload));
                }

                let mut remove_me = false;
                let mut terminate = false;
                for slot in 0..pairs[index].actions.len() {
                    let elapsed = started.elapsed().as_secs_f64();
                    match &mut pairs[index].actions[slot] {
                        Action::Continue => {}
                        Action::ClickIt => {
                            debug!("已找到 {name}，执行点击，等候耗时 {elapsed:.2} 秒");
                            let point = results[0].point;
                            let click = self.defaults.click;
                            self.move_click(ClickTarget::Point(point), click)?;
                        }
                        Action::RemoveMe => {
                            debug!("已找到 {name}，移除检查，等候耗时 {elapsed:.2} 秒");
                            remove_me = true;
                        }
                        Action::Call(callback) => {
                            debug!("已找到 {name}，执行函数，等候耗时 {elapsed:.2} 秒");
                            callback.invoke();
                        }
                        Action::Return => {
                            debug!("已找到 {name}，执行返回，等候耗时 {elapsed:.2} 秒");
                            terminate = true;
                        }
                        unexpected => {
                            warn!("非预期的操作 {unexpected:?}");
                        }
                    }
                    if terminate {
                        break;
                    }
                }

                if terminate {
                    let payload = pairs[index].returns.take();
                    return Ok((results, payload));
                }
                if remove_me {
                    pairs.remove(index);
                } else {
                    index += 1;
                }
            }

            sleep(opts.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use stagebot_core::{Callback, rightmost};
    use stagebot_cv::MatchConfig;

    fn textured(width: u32, height: u32, seed: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = (x
                .wrapping_mul(31)
                .wrapping_add(y.wrapping_mul(57))
                .wrapping_add(seed)
                .wrapping_mul(2654435761)
                >> 16) as u8;
            image::Rgba([v, v, v, 255])
        })
    }

    struct ScriptedScreen {
        frames: Vec<RgbaImage>,
        cursor: usize,
        grabs: Rc<Cell<usize>>,
    }

    impl ScreenSource for ScriptedScreen {
        fn grab(&mut self) -> stagebot_cv::Result<RgbaImage> {
            self.grabs.set(self.grabs.get() + 1);
            let frame = self.frames[self.cursor].clone();
            if self.cursor + 1 < self.frames.len() {
                self.cursor += 1;
            }
            Ok(frame)
        }
    }

    struct RecordingPointer {
        position: Point,
        clicks: Rc<RefCell<Vec<Point>>>,
    }

    impl crate::pointer::PointerDevice for RecordingPointer {
        fn move_to(&mut self, x: f64, y: f64, _duration: f32) -> Result<()> {
            self.position = Point::new(x, y);
            Ok(())
        }

        fn click(&mut self) -> Result<()> {
            self.clicks.borrow_mut().push(self.position);
            Ok(())
        }
    }

    type Handles = (Rc<Cell<usize>>, Rc<RefCell<Vec<Point>>>);

    fn engine_with_frames(frames: Vec<RgbaImage>) -> (Engine, Handles) {
        let grabs = Rc::new(Cell::new(0));
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let screen = ScriptedScreen {
            frames,
            cursor: 0,
            grabs: Rc::clone(&grabs),
        };
        let pointer = PointerController::new(
            Box::new(RecordingPointer {
                position: Point::new(0.0, 0.0),
                clicks: Rc::clone(&clicks),
            }),
            Point::new(0.0, 0.0),
        );
        let engine = Engine::new(
            Matcher::new(MatchConfig::default()),
            Box::new(screen),
            pointer,
            AssetLibrary::new("unused"),
            EngineDefaults::immediate(),
        );
        (engine, (grabs, clicks))
    }

    fn base_with_patch() -> (RgbaImage, RgbaImage) {
        let base = textured(120, 120, 7);
        let patch = image::imageops::crop_imm(&base, 30, 40, 20, 20).to_image();
        (base, patch)
    }

    #[test]
    fn test_zero_pairs_returns_after_delay_without_capture() -> Result<()> {
        let (mut engine, (grabs, _)) = engine_with_frames(vec![textured(40, 40, 7)]);

        let opts = PollOptions {
            delay: Duration::from_millis(30),
            ..PollOptions::immediate()
        };
        let started = Instant::now();
        let (matches, payload) = engine.check_and_wait::<()>(Vec::new(), opts)?;

        assert!(matches.is_empty());
        assert!(payload.is_none());
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(grabs.get(), 0);
        Ok(())
    }

    #[test]
    fn test_present_pair_terminates_on_first_tick() -> Result<()> {
        let (base, patch) = base_with_patch();
        let absent = textured(20, 20, 99);
        let (mut engine, (grabs, _)) = engine_with_frames(vec![base]);

        let pairs = vec![
            CheckPair::new("从未出现", absent)
                .with_actions(vec![Action::Return])
                .with_returns("A"),
            CheckPair::new("已出现", patch)
                .with_actions(vec![Action::Return])
                .with_returns("B"),
        ];
        let (matches, payload) = engine.check_and_wait(pairs, PollOptions::immediate())?;

        assert!(!matches.is_empty());
        assert_eq!(payload, Some("B"));
        assert_eq!(grabs.get(), 1);
        Ok(())
    }

    #[test]
    fn test_clickit_clicks_once_before_returning() -> Result<()> {
        let (base, patch) = base_with_patch();
        let (mut engine, (_, clicks)) = engine_with_frames(vec![base]);

        let pairs = vec![
            CheckPair::new("点击目标", patch)
                .with_actions(vec![Action::ClickIt, Action::Return])
                .with_returns(7),
        ];
        let (_, payload) = engine.check_and_wait(pairs, PollOptions::immediate())?;

        assert_eq!(payload, Some(7));
        let clicks = clicks.borrow();
        assert_eq!(clicks.len(), 1);
        // patch lives at (30, 40) with size 20x20
        assert_eq!(clicks[0], Point::new(40.0, 50.0));
        Ok(())
    }

    #[test]
    fn test_removeme_empties_the_pair_set() -> Result<()> {
        let (base, patch) = base_with_patch();
        let (mut engine, (grabs, _)) = engine_with_frames(vec![base]);

        let pairs = vec![
            CheckPair::new("一次性检查", patch)
                .with_actions(vec![Action::RemoveMe])
                .with_returns(1),
        ];
        let (matches, payload) = engine.check_and_wait(pairs, PollOptions::immediate())?;

        assert!(matches.is_empty());
        assert!(payload.is_none());
        // one capture matched the pair; emptiness is noticed without another
        assert_eq!(grabs.get(), 1);
        Ok(())
    }

    #[test]
    fn test_call_runs_the_bound_procedure() -> Result<()> {
        let (base, patch) = base_with_patch();
        let (mut engine, _) = engine_with_frames(vec![base]);

        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        let pairs = vec![
            CheckPair::new("带回调的检查", patch)
                .with_actions(vec![
                    Action::Continue,
                    Action::Call(Callback::new(move || handle.set(handle.get() + 1))),
                    Action::Return,
                ])
                .with_returns(true),
        ];
        let (_, payload) = engine.check_and_wait(pairs, PollOptions::immediate())?;

        assert_eq!(payload, Some(true));
        assert_eq!(count.get(), 1);
        Ok(())
    }

    #[test]
    fn test_result_filter_keeps_rightmost_match() -> Result<()> {
        let mut base = textured(140, 80, 7);
        let patch = textured(16, 16, 21);
        image::imageops::overlay(&mut base, &patch, 10, 30);
        image::imageops::overlay(&mut base, &patch, 90, 30);
        let (mut engine, _) = engine_with_frames(vec![base]);

        let pairs = vec![CheckPair::new("重复元素", patch).with_returns("done")];
        let opts = PollOptions::immediate().with_result_filter(rightmost);
        let (matches, payload) = engine.check_and_wait(pairs, opts)?;

        assert_eq!(payload, Some("done"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rect.x, 90);
        Ok(())
    }

    #[test]
    fn test_move_click_on_missing_image_is_image_not_found() {
        let (mut engine, _) = engine_with_frames(vec![textured(60, 60, 7)]);
        let absent = textured(16, 16, 99);

        let err = engine
            .move_click(ClickTarget::Image(&absent), ClickOptions::immediate())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CvError>(),
            Some(CvError::ImageNotFound(_))
        ));
    }

    #[test]
    fn test_move_click_on_image_clicks_match_center() -> Result<()> {
        let (base, patch) = base_with_patch();
        let (mut engine, (_, clicks)) = engine_with_frames(vec![base]);

        engine.move_click(ClickTarget::Image(&patch), ClickOptions::immediate())?;

        let clicks = clicks.borrow();
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0], Point::new(40.0, 50.0));
        Ok(())
    }
}
