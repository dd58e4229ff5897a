//! End-to-end scenarios across the registry, hub, scene and scheduler

mod scene;
