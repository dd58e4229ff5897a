use crate::events::EventHub;
use crate::foundation::geometry::Rectangle;
use crate::foundation::time::ManualClock;
use crate::object::{builtin, EntityDesc, ObjectRegistry};
use crate::render::CommandRecorder;
use crate::scene::{Colour, Sprite, Transform2D, ViewportOptions};
use crate::{config::GameConfig, Game};

#[test]
fn reparenting_moves_a_child_between_containers() {
    let mut registry = ObjectRegistry::new();
    let mut hub = EventHub::new();
    let mut spawn = |caps: &[&str]| registry.init(EntityDesc::new(), "node", caps, true, &mut hub).unwrap();
    let c = spawn(&[builtin::CHILDREN]);
    let d = spawn(&[builtin::CHILDREN]);
    let a = spawn(&[]);
    let b = spawn(&[]);

    registry.add_child(c, a).unwrap();
    registry.add_child(c, b).unwrap();
    registry.add_child(d, a).unwrap();

    assert_eq!(registry.get(c).unwrap().children(), [b]);
    assert_eq!(registry.get(d).unwrap().children(), [a]);
    assert_eq!(registry.get(a).unwrap().parent(), Some(d));
}

#[test]
fn destroying_a_container_orphans_its_children() {
    let mut game = Game::new(GameConfig::default(), CommandRecorder::new()).unwrap();
    let container = game.create_container(EntityDesc::new()).unwrap();
    let child = game.create_sprite(EntityDesc::new(), Sprite::default()).unwrap();
    game.add_child(container, child).unwrap();

    game.destroy(container).unwrap();

    let child = game.registry().get(child).unwrap();
    assert_eq!(child.parent(), None);
}

#[test]
fn scrolling_the_viewport_moves_every_sprite() {
    let clock = ManualClock::new(0.0);
    let mut game = Game::with_clock(
        GameConfig::default(),
        CommandRecorder::with_surface("#canvas"),
        clock.clone(),
    )
    .unwrap();
    let viewport = game
        .create_viewport(
            EntityDesc::new(),
            ViewportOptions {
                bounds: Rectangle::new(0.0, 0.0, 640.0, 480.0),
                ..ViewportOptions::default()
            },
        )
        .unwrap();
    let world = game
        .create_container(EntityDesc::new().with_transform(Transform2D::at(100.0, 0.0)))
        .unwrap();
    let rock = game
        .create_sprite(
            EntityDesc::new().with_transform(Transform2D::at(5.0, 5.0)),
            Sprite::new(Rectangle::new(0.0, 0.0, 10.0, 10.0), Colour::WHITE),
        )
        .unwrap();
    game.add_child(viewport, world).unwrap();
    game.add_child(world, rock).unwrap();

    game.start().unwrap();
    game.step().unwrap();
    let before = game.registry().get(rock).unwrap().derived().origin;

    game.viewport_mut(viewport).unwrap().scroll_to(30.0, 10.0);
    clock.advance(100.0);
    game.step().unwrap();
    let after = game.registry().get(rock).unwrap().derived().origin;

    assert_eq!((before.x, before.y), (105.0, 5.0));
    assert_eq!((after.x, after.y), (75.0, -5.0));
}

#[test]
fn later_children_paint_on_top() {
    let mut game = Game::new(GameConfig::default(), CommandRecorder::with_surface("#canvas")).unwrap();
    let viewport = game.create_viewport(EntityDesc::new(), ViewportOptions::default()).unwrap();
    let square = Sprite::new(Rectangle::new(0.0, 0.0, 1.0, 1.0), Colour::BLACK);
    let back = game.create_sprite(EntityDesc::new(), square).unwrap();
    let front = game.create_sprite(EntityDesc::new(), square).unwrap();
    game.add_child(viewport, back).unwrap();
    game.add_child(viewport, front).unwrap();

    game.start().unwrap();
    game.step().unwrap();

    assert_eq!(game.backend().painted(), vec![back, front]);
}
