//! Window management and frame display.
//!
//! The windowing event loop must run on the main thread, so [`run`] takes
//! over the main thread and executes the application code on a separate
//! thread. Windows are created lazily, the first time an image is shown
//! under a new name.

mod renderer;

use std::{
    collections::HashMap,
    panic::{catch_unwind, AssertUnwindSafe},
    process,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use once_cell::sync::OnceCell;
use winit::{
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy},
    window::WindowId,
};

use crate::{
    image::Image,
    pipeline::Ui,
    resolution::Resolution,
    termination::Termination,
};

use self::renderer::{Gpu, Renderer, Window};

/// Set when the user presses Q or closes a window; checked by the pipeline
/// at its iteration boundary.
static CANCEL: AtomicBool = AtomicBool::new(false);

struct Gui {
    gpu: Rc<Gpu>,
    windows: HashMap<String, Renderer>,
    win_id_to_key: HashMap<WindowId, String>,
}

impl Gui {
    fn new() -> Self {
        Self {
            gpu: Rc::new(pollster::block_on(Gpu::open()).unwrap()),
            windows: HashMap::new(),
            win_id_to_key: HashMap::new(),
        }
    }

    fn run(mut self, event_loop: EventLoop<Msg>) -> ! {
        event_loop.run(move |event, target, flow| {
            *flow = ControlFlow::Wait;
            match event {
                Event::UserEvent(msg) => match msg {
                    Msg::Image { key, res, data } => {
                        let renderer = self.windows.entry(key.clone()).or_insert_with(|| {
                            log::debug!("creating window for image '{key}' at {res}");

                            let win = Window::open(target, &key, res).unwrap();
                            let win_id = win.win.id();
                            let renderer = Renderer::new(win, self.gpu.clone()).unwrap();

                            self.win_id_to_key.insert(win_id, key.clone());

                            renderer
                        });

                        renderer.update_texture(res, &data);
                        renderer.window().request_redraw();
                    }
                },
                Event::RedrawRequested(window) => {
                    if let Some(key) = self.win_id_to_key.get(&window) {
                        self.windows.get_mut(key).unwrap().redraw();
                    }
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        log::debug!("window close requested");
                        CANCEL.store(true, Ordering::Relaxed);
                    }
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Q),
                                ..
                            },
                        ..
                    } => {
                        log::debug!("Q pressed");
                        CANCEL.store(true, Ordering::Relaxed);
                    }
                    _ => {}
                },
                _ => {}
            }
        });
    }
}

#[derive(Debug)]
enum Msg {
    Image {
        key: String,
        res: Resolution,
        data: Vec<u8>,
    },
}

/// A handle to the running event loop.
struct Display {
    proxy: Mutex<EventLoopProxy<Msg>>,
}

static DISPLAY: OnceCell<Display> = OnceCell::new();

fn send(msg: Msg) -> anyhow::Result<()> {
    let display = DISPLAY
        .get()
        .ok_or_else(|| anyhow::anyhow!("display not initialized"))?;
    display
        .proxy
        .lock()
        .unwrap()
        .send_event(msg)
        .map_err(|_| anyhow::anyhow!("event loop has shut down"))?;
    Ok(())
}

/// Runs `cb` on a worker thread while the windowing event loop occupies the
/// calling (main) thread.
///
/// Never returns: once `cb` finishes, the process exits with code 0 on
/// success, a nonzero code if `cb` returned an error, or 101 if it panicked.
pub fn run<F, R>(cb: F) -> !
where
    F: FnOnce() -> R + Send + 'static,
    R: Termination + Send,
{
    let event_loop = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();
    DISPLAY
        .set(Display {
            proxy: Mutex::new(proxy),
        })
        .ok()
        .expect("display already initialized");

    std::thread::spawn(move || {
        let result = catch_unwind(AssertUnwindSafe(cb));
        match result {
            Ok(r) => {
                if r.is_success() {
                    process::exit(0);
                } else {
                    r.report(); // may print the error message
                    process::exit(1);
                }
            }
            Err(_payload) => {
                // The panic hook has printed the message and backtrace
                // already; exit with 101 to mimick libstd behavior.
                process::exit(101);
            }
        }
    });

    let gui = Gui::new();
    gui.run(event_loop);
}

/// Displays an image in a window, creating the window on first use.
pub fn show_image(key: impl Into<String>, image: &Image) -> anyhow::Result<()> {
    // Image data is RGBA8 internally so that no conversion before GPU upload
    // is needed.
    send(Msg::Image {
        key: key.into(),
        res: image.resolution(),
        data: image.data().to_vec(),
    })
}

/// The windowed [`Ui`] implementation used by the binary.
#[derive(Debug, Default)]
pub struct WindowUi {
    _priv: (),
}

impl WindowUi {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ui for WindowUi {
    fn show(&mut self, window: &str, image: &Image) -> anyhow::Result<()> {
        show_image(window, image)
    }

    fn cancel_requested(&mut self) -> bool {
        CANCEL.load(Ordering::Relaxed)
    }
}
