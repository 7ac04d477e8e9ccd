use glam::Vec3;
use joint_drag::kinematics::{JointSpec, KinematicTree, TreeError};
use joint_drag::manipulation::{ManipulationConfig, ManipulationEvent, Manipulator};
use joint_drag::math::Transform;
use joint_drag::picking::{BoxShape, CylinderShape, SphereShape};
use joint_drag::{Camera, OrbitController};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

fn build_arm() -> Result<KinematicTree, TreeError> {
    KinematicTree::builder("base")
        .link("turret")
        .link("upper_arm")
        .link("forearm")
        .link("slide")
        .joint(
            JointSpec::continuous("base_yaw", "base", "turret")
                .axis(Vec3::Y)
                .origin(Transform::from_position(Vec3::new(0.0, 0.2, 0.0))),
        )
        .joint(
            JointSpec::revolute("shoulder_pitch", "turret", "upper_arm")
                .axis(Vec3::Z)
                .limits(-120f32.to_radians(), 120f32.to_radians())
                .origin(Transform::from_position(Vec3::new(0.0, 0.3, 0.0))),
        )
        .joint(
            JointSpec::revolute("elbow_pitch", "upper_arm", "forearm")
                .axis(Vec3::Z)
                .limits(-120f32.to_radians(), 120f32.to_radians())
                .origin(Transform::from_position(Vec3::new(0.0, 1.2, 0.0))),
        )
        .joint(
            JointSpec::prismatic("wrist_slide", "forearm", "slide")
                .axis(Vec3::Y)
                .limits(0.0, 0.4)
                .origin(Transform::from_position(Vec3::new(0.0, 1.0, 0.0))),
        )
        .surface("base", CylinderShape::new(0.6, 0.2))
        .surface("turret", BoxShape::from_size(Vec3::new(0.5, 0.3, 0.5)))
        .surface("upper_arm", CylinderShape::new(0.12, 1.2))
        .surface("forearm", SphereShape::new(Vec3::new(0.0, 0.5, 0.0), 0.15))
        .surface("slide", BoxShape::from_size(Vec3::splat(0.15)))
        .build()
}

struct App {
    window: Option<Arc<Window>>,
    tree: KinematicTree,
    manipulator: Manipulator,
    events: Vec<ManipulationEvent>,
    camera: Camera,
    orbit: OrbitController,
    window_size: (f32, f32),
    mouse_pos: PhysicalPosition<f64>,
    right_mouse_pressed: bool,
    camera_suspended: bool,
}

impl App {
    fn new(tree: KinematicTree) -> Self {
        let camera = Camera::default();
        let orbit = OrbitController::new(Vec3::new(0.0, 1.2, 0.0), 6.0);

        Self {
            window: None,
            tree,
            manipulator: Manipulator::new(ManipulationConfig::default()),
            events: Vec::new(),
            camera,
            orbit,
            window_size: (1280.0, 720.0),
            mouse_pos: PhysicalPosition::new(0.0, 0.0),
            right_mouse_pressed: false,
            camera_suspended: false,
        }
    }

    fn pointer_moved(&mut self) {
        let ray = self.camera.pointer_ray(
            self.mouse_pos.x as f32,
            self.mouse_pos.y as f32,
            self.window_size.0,
            self.window_size.1,
        );
        self.manipulator.pointer_move(&mut self.tree, ray, &mut self.events);
        self.drain_events();
    }

    fn drain_events(&mut self) {
        for event in self.events.drain(..) {
            let Some(joint) = self.tree.joint(event.handle().joint) else {
                continue;
            };
            match event {
                ManipulationEvent::Hover(_) => log::info!("hover {}", joint.name()),
                ManipulationEvent::Unhover(_) => log::info!("unhover {}", joint.name()),
                ManipulationEvent::ManipulateStart(_) => {
                    self.camera_suspended = true;
                    self.orbit.stop();
                    log::info!("start dragging {}", joint.name());
                }
                ManipulationEvent::ManipulateEnd(_) => {
                    log::info!("finished {} at {:.4}", joint.name(), joint.value());
                }
                ManipulationEvent::ValueChange(_) => {
                    log::info!("{} = {:.4}", joint.name(), joint.value());
                }
            }
        }
    }

    fn reload(&mut self) {
        match build_arm() {
            Ok(tree) => {
                self.tree = tree;
                log::info!("model reloaded");
            }
            Err(e) => log::error!("reload failed: {}", e),
        }
    }

    fn update(&mut self) {
        if !self.camera_suspended {
            self.orbit.update();
        }
        self.orbit.update_camera(&mut self.camera);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title("Joint Drag Demo")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

            let window = match event_loop.create_window(window_attrs) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    log::error!("could not create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let size = window.inner_size();
            self.window_size = (size.width.max(1) as f32, size.height.max(1) as f32);
            self.camera.set_aspect(self.window_size.0 / self.window_size.1);
            self.orbit.update_camera(&mut self.camera);
            self.window = Some(window);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        match code {
                            KeyCode::Escape => event_loop.exit(),
                            KeyCode::KeyR => self.reload(),
                            _ => {}
                        }
                    }
                }
            }
            WindowEvent::Resized(size) => {
                self.window_size = (size.width.max(1) as f32, size.height.max(1) as f32);
                self.camera.set_aspect(self.window_size.0 / self.window_size.1);
            }
            WindowEvent::MouseInput { state, button, .. } => match button {
                MouseButton::Left => {
                    if state == ElementState::Pressed {
                        self.manipulator.pointer_down(&self.tree, &mut self.events);
                    } else {
                        self.manipulator.pointer_up(&self.tree, &mut self.events);
                        self.camera_suspended = false;
                    }
                    self.drain_events();
                }
                MouseButton::Right => {
                    self.right_mouse_pressed = state == ElementState::Pressed;
                }
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = position.x - self.mouse_pos.x;
                let delta_y = position.y - self.mouse_pos.y;
                self.mouse_pos = position;

                if self.right_mouse_pressed && self.manipulator.grabbed().is_none() {
                    self.orbit.rotate(delta_x as f32, delta_y as f32);
                }
                self.pointer_moved();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                if !self.camera_suspended {
                    self.orbit.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                self.update();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let tree = build_arm()?;
    log::info!("loaded {:?}", tree);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(tree);
    event_loop.run_app(&mut app)?;
    Ok(())
}
