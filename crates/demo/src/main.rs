use anyhow::Result;
use clap::Parser;
use glam::{Quat, Vec3};

use tether::{LinkConditions, LossyLink, NodeRole, SyncConfig, Transform, TransformSync};

const PATH_RADIUS: f32 = 5.0;
const ANGULAR_SPEED: f64 = 0.8;

#[derive(Parser)]
#[command(name = "tether-demo")]
#[command(about = "Transform sync over a simulated lossy link")]
struct Args {
    #[arg(long, default_value_t = 10.0, help = "Simulated session length in seconds")]
    duration: f64,

    #[arg(long, default_value_t = 60, help = "Simulation tick rate in Hz")]
    tick_rate: u32,

    #[arg(long, default_value_t = 20, help = "Snapshot send rate in Hz")]
    send_rate: u32,

    #[arg(long, default_value_t = 3, help = "Playback delay in send intervals")]
    buffer_multiplier: u32,

    #[arg(long, default_value_t = 0.0, help = "Packet loss percentage (0-100)")]
    loss_percent: f32,

    #[arg(long, default_value_t = 40, help = "Minimum latency in ms")]
    min_latency: u32,

    #[arg(long, default_value_t = 80, help = "Maximum latency in ms")]
    max_latency: u32,

    #[arg(long, default_value_t = 20, help = "Jitter in ms")]
    jitter: u32,

    #[arg(long, help = "Let the client own the entity and the server follow")]
    client_authority: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = SyncConfig {
        client_authority: args.client_authority,
        send_interval: 1.0 / args.send_rate.max(1) as f32,
        buffer_time_multiplier: args.buffer_multiplier,
        ..Default::default()
    };

    let conditions = LinkConditions {
        loss_percent: args.loss_percent,
        min_latency_ms: args.min_latency,
        max_latency_ms: args.max_latency,
        jitter_ms: args.jitter,
    };

    let (sender_role, receiver_role) = if args.client_authority {
        (NodeRole::CLIENT | NodeRole::OWNER, NodeRole::SERVER)
    } else {
        (NodeRole::SERVER, NodeRole::CLIENT)
    };

    let mut sender = TransformSync::new(config.clone(), sender_role);
    let mut receiver = TransformSync::new(config.clone(), receiver_role);
    let mut link = LossyLink::new(conditions);

    log::info!(
        "session: {}s at {} Hz, snapshots at {} Hz, buffer {} intervals ({:.0} ms), {} authority",
        args.duration,
        args.tick_rate,
        args.send_rate,
        args.buffer_multiplier,
        config.buffer_time() * 1000.0,
        if args.client_authority { "client" } else { "server" },
    );

    let mut driven_pose = Transform::default();
    let mut follow_pose = Transform::default();

    let dt = 1.0 / args.tick_rate.max(1) as f64;
    let steps = (args.duration / dt).ceil() as u64;

    let mut path_error_sum = 0.0f64;
    let mut path_error_max = 0.0f32;
    let mut error_samples = 0u64;
    let mut next_report = 1.0f64;

    for step in 0..=steps {
        let t = step as f64 * dt;

        // Authoritative motion: a circle in the xz plane, facing along the
        // direction of travel.
        let angle = t * ANGULAR_SPEED;
        driven_pose.position = Vec3::new(
            angle.cos() as f32 * PATH_RADIUS,
            0.0,
            angle.sin() as f32 * PATH_RADIUS,
        );
        driven_pose.rotation = Quat::from_rotation_y(-angle as f32);

        if let Some(out) = sender.on_tick(t, &mut driven_pose) {
            link.send(t, out.channel, &out.message);
        }
        for (remote_ts, message) in link.recv(t) {
            receiver.on_received(remote_ts, &message);
        }
        receiver.on_tick(t, &mut follow_pose);

        if receiver.stats().poses_applied > 0 {
            // Distance off the circular path, independent of playback lag.
            let radial = Vec3::new(follow_pose.position.x, 0.0, follow_pose.position.z).length();
            let error = (radial - PATH_RADIUS).abs();
            path_error_sum += error as f64;
            path_error_max = path_error_max.max(error);
            error_samples += 1;
        }

        if t >= next_report {
            next_report += 1.0;
            let stats = receiver.stats();
            log::info!(
                "t={:5.1}s driven=({:6.2},{:6.2}) follow=({:6.2},{:6.2}) applied={} rejected={}",
                t,
                driven_pose.position.x,
                driven_pose.position.z,
                follow_pose.position.x,
                follow_pose.position.z,
                stats.poses_applied,
                stats.snapshots_rejected,
            );
        }
    }

    let stats = receiver.stats();
    log::info!(
        "link: {} sent, {} dropped, {} still in flight",
        link.messages_sent(),
        link.messages_dropped(),
        link.in_flight(),
    );
    log::info!(
        "receiver: {} received, {} rejected, {} poses applied",
        stats.snapshots_received,
        stats.snapshots_rejected,
        stats.poses_applied,
    );

    if error_samples > 0 {
        let lag = playback_lag_secs(&driven_pose, &follow_pose);
        log::info!(
            "path error: mean {:.4} max {:.4} over {} samples, playback lag ~{:.0} ms",
            path_error_sum / error_samples as f64,
            path_error_max,
            error_samples,
            lag * 1000.0,
        );
    } else {
        log::warn!("no poses were applied; link conditions too hostile for this session length");
    }

    Ok(())
}

// Phase difference along the circle, converted back to seconds.
fn playback_lag_secs(driven: &Transform, follow: &Transform) -> f64 {
    let driven_angle = (driven.position.z).atan2(driven.position.x) as f64;
    let follow_angle = (follow.position.z).atan2(follow.position.x) as f64;
    let mut diff = driven_angle - follow_angle;
    while diff < 0.0 {
        diff += std::f64::consts::TAU;
    }
    while diff >= std::f64::consts::TAU {
        diff -= std::f64::consts::TAU;
    }
    diff / ANGULAR_SPEED
}
