// Drag gestures driving a comparison view
use std::cell::RefCell;
use std::rc::Rc;

use image::{Rgba, RgbaImage};

use swipe_compare::config::CompareConfig;
use swipe_compare::drag::{
    Affordance, CaptureHandle, DragController, DragHost, DragState, FrameHandle, HeadlessHost,
    PointerSample,
};
use swipe_compare::model::{DisplaySettings, Side, SplitPosition, ViewMode};
use swipe_compare::source::ImageSource;
use swipe_compare::view::{ComparisonView, ConfigChange};

/// 把帧回调排队、把位置变化转发给会话的宿主。
struct ViewHost {
    view: Rc<RefCell<ComparisonView>>,
    frames: Vec<FrameHandle>,
    next_id: u64,
    captured: bool,
}

impl DragHost for ViewHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.frames.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|f| *f != handle);
    }

    fn capture_pointer(&mut self) -> CaptureHandle {
        self.captured = true;
        CaptureHandle(0)
    }

    fn release_pointer(&mut self, _handle: CaptureHandle) {
        self.captured = false;
    }

    fn set_drag_indicator(&mut self, _affordance: Option<Affordance>) {}

    fn split_changed(&mut self, split: SplitPosition) {
        self.view.borrow_mut().preview_split(split);
    }

    fn commit_split(&mut self, split: SplitPosition) {
        self.view.borrow_mut().commit_split(split);
    }
}

fn source(w: u32, h: u32) -> ImageSource {
    ImageSource::from_rgba(RgbaImage::from_pixel(w, h, Rgba([90, 90, 90, 255]))).unwrap()
}

#[test]
fn split_updates_only_after_frame_tick() {
    let mut drag = DragController::new(HeadlessHost::new(), SplitPosition::new(50.0));
    assert!(drag.pointer_down(Affordance::Line, PointerSample::mouse(300.0), 1000.0));
    assert_eq!(drag.state(), DragState::Dragging);

    drag.pointer_move(PointerSample::mouse(400.0));
    assert_eq!(drag.split_position().percent(), 50.0);

    let frame = drag.host_mut().next_frame().unwrap();
    drag.on_frame(frame);
    assert_eq!(drag.split_position().percent(), 60.0);
}

#[test]
fn gesture_persists_final_position_once() {
    let view = Rc::new(RefCell::new(ComparisonView::new(
        CompareConfig::default(),
        DisplaySettings::default(),
    )));
    {
        let mut view = view.borrow_mut();
        view.set_source(Side::Before, source(1000, 400));
        view.set_source(Side::After, source(1000, 400));
    }

    let saved = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&saved);
    view.borrow_mut()
        .set_observer(move |change| sink.borrow_mut().push(change.clone()));

    let container_width = view.borrow().drag_width().unwrap();
    let host = ViewHost {
        view: Rc::clone(&view),
        frames: Vec::new(),
        next_id: 0,
        captured: false,
    };
    let start = view.borrow().settings().split_position;
    let mut drag = DragController::new(host, start);

    assert!(drag.pointer_down(Affordance::Grip, PointerSample::touch(500.0), container_width));
    assert!(drag.host().captured);

    drag.pointer_move(PointerSample::touch(600.0));
    let frame = drag.host_mut().frames.remove(0);
    drag.on_frame(frame);
    assert_eq!(view.borrow().settings().split_position.percent(), 60.0);
    assert!(saved.borrow().is_empty());

    drag.pointer_move(PointerSample::touch(250.0));
    let committed = drag.pointer_up().unwrap();

    assert_eq!(committed.percent(), 25.0);
    assert!(!drag.host().captured);
    assert!(drag.host().frames.is_empty());
    assert_eq!(
        *saved.borrow(),
        vec![ConfigChange::SplitPosition(SplitPosition::new(25.0))]
    );

    let frame = view.borrow_mut().render_frame().unwrap();
    assert_eq!(frame.image.dimensions(), (1000, 400));
}

#[test]
fn dropping_controller_mid_gesture_releases_capture() {
    let view = Rc::new(RefCell::new(ComparisonView::new(
        CompareConfig::default(),
        DisplaySettings::default(),
    )));
    let saved = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&saved);
    view.borrow_mut().set_observer(move |_| *sink.borrow_mut() += 1);

    let host = ViewHost {
        view: Rc::clone(&view),
        frames: Vec::new(),
        next_id: 0,
        captured: false,
    };
    let mut drag = DragController::new(host, SplitPosition::default());
    drag.pointer_down(Affordance::Line, PointerSample::mouse(0.0), 200.0);
    drag.pointer_move(PointerSample::mouse(50.0));

    assert!(drag.abort());
    assert!(!drag.host().captured);
    assert_eq!(drag.state(), DragState::Idle);
    drop(drag);
    assert_eq!(*saved.borrow(), 0);
}

#[test]
fn side_by_side_view_offers_no_drag() {
    let mut view = ComparisonView::new(CompareConfig::default(), DisplaySettings::default());
    view.set_source(Side::Before, source(300, 200));
    view.set_source(Side::After, source(300, 200));
    view.set_view_mode(ViewMode::SideBySide);

    let mut drag = DragController::new(HeadlessHost::new(), view.settings().split_position);
    let started = view.drag_width().is_some_and(|width| {
        drag.pointer_down(Affordance::Line, PointerSample::mouse(10.0), width)
    });

    assert!(!started);
    assert_eq!(drag.state(), DragState::Idle);
}
