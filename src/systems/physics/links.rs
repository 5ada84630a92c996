use crate::domain::World;

use super::collision::DEGENERATE_DISTANCE;

/// One Gauss-Seidel pass over all distance links.
///
/// Each link moves its ends along their axis until they sit at the target
/// distance, half the correction each. A frozen end stays put and the other
/// end takes the whole correction. Links run sequentially since two links may
/// share a particle.
///
/// Returns the number of links skipped because their ends coincide.
pub fn relax_links(world: &mut World) -> u64 {
    let (links, particles) = world.links_and_particles_mut();
    let mut degenerate = 0u64;

    for link in links {
        let a = particles[link.a];
        let b = particles[link.b];
        if a.frozen && b.frozen {
            continue;
        }

        let axis = b.position_current - a.position_current;
        let dist = axis.length();
        if !(dist >= DEGENERATE_DISTANCE) {
            degenerate += 1;
            continue;
        }
        let correction = axis * ((dist - link.target_distance) / dist);

        if a.frozen {
            particles[link.b].position_current -= correction;
        } else if b.frozen {
            particles[link.a].position_current += correction;
        } else {
            particles[link.a].position_current += correction * 0.5;
            particles[link.b].position_current -= correction * 0.5;
        }
    }
    degenerate
}
