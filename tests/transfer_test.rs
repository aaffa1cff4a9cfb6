use approx::assert_relative_eq;
use mpm_mesh::{Cell, Mesh, Node, NodeBase, Particle, ParticleBase, ShapeFn, VoigtStress};
use nalgebra::{Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EPS: f64 = 1e-9;

/// `nx` x `ny` square cells of side `h`, neighbours linked across faces.
fn grid_2d(nx: usize, ny: usize, h: f64) -> Mesh<2> {
    let node = |i: usize, j: usize| j * (nx + 1) + i;
    let mut mesh = Mesh::new(0);
    for j in 0..=ny {
        for i in 0..=nx {
            mesh.add_node(Node::new(node(i, j), Vector2::new(i as f64 * h, j as f64 * h)));
        }
    }
    for j in 0..ny {
        for i in 0..nx {
            let id = j * nx + i;
            let mut cell = Cell::with_shapefn(id, 4, ShapeFn::Quadrilateral4).unwrap();
            let corners = [node(i, j), node(i + 1, j), node(i + 1, j + 1), node(i, j + 1)];
            for (local, &node_id) in corners.iter().enumerate() {
                cell.add_node(local, node_id);
            }
            let mut slot = 0;
            for (di, dj) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let (ni, nj) = (i as i64 + di, j as i64 + dj);
                if ni >= 0 && nj >= 0 && (ni as usize) < nx && (nj as usize) < ny {
                    cell.add_neighbour(slot, nj as usize * nx + ni as usize);
                    slot += 1;
                }
            }
            mesh.add_cell(cell);
        }
    }
    mesh.compute_cell_volumes().unwrap();
    mesh
}

/// Four particles per cell at the 2 x 2 Gauss points.
fn seed_particles(mesh: &mut Mesh<2>, nx: usize, ny: usize, h: f64) {
    let offset = 0.5 / 3.0_f64.sqrt();
    let mut id = 0;
    for j in 0..ny {
        for i in 0..nx {
            for (a, b) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let x = (i as f64 + 0.5 + a * offset) * h;
                let y = (j as f64 + 0.5 + b * offset) * h;
                let volume = h * h / 4.0;
                mesh.add_particle(
                    Particle::new(id, Vector2::new(x, y))
                        .with_volume(volume)
                        .with_mass(1000.0 * volume),
                );
                id += 1;
            }
        }
    }
}

fn scatter_mass_and_momentum(mesh: &mut Mesh<2>) {
    let (cells, nodes, particles) = mesh.parts_mut();
    for particle in particles {
        let cell = cells.get(particle.cell_id().unwrap()).unwrap();
        let xi = particle.local_coordinates().unwrap();
        cell.map_particle_mass_to_nodes(nodes, &xi, particle.phase, particle.mass)
            .unwrap();
        cell.compute_nodal_momentum(nodes, &xi, particle.phase, particle.mass, &particle.velocity)
            .unwrap();
    }
}

#[test]
fn every_particle_is_located() {
    let mut mesh = grid_2d(3, 2, 0.5);
    seed_particles(&mut mesh, 3, 2, 0.5);

    let report = mesh.locate_particles_mesh().unwrap();

    assert!(report.all_located());
    assert_eq!(report.located, 24);
    assert!(mesh.cells().values().all(|cell| cell.nparticles() == 4));
    assert!(mesh.status());
}

#[test]
fn p2g_conserves_mass_and_momentum() {
    let mut mesh = grid_2d(2, 2, 1.0);
    seed_particles(&mut mesh, 2, 2, 1.0);
    let mut rng = StdRng::seed_from_u64(11);
    mesh.iterate_over_particles(|particle| {
        particle.velocity = Vector2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
    });
    mesh.locate_particles_mesh().unwrap();

    scatter_mass_and_momentum(&mut mesh);

    let particle_mass: f64 = mesh.particles().map(|p| p.mass).sum();
    let particle_momentum = mesh
        .particles()
        .fold(Vector2::zeros(), |sum, p| sum + p.velocity * p.mass);
    let nodal_mass: f64 = mesh.nodes().values().map(|node| node.mass(0)).sum();
    let nodal_momentum = mesh
        .nodes()
        .values()
        .fold(Vector2::zeros(), |sum, node| sum + node.momentum(0));

    assert_relative_eq!(nodal_mass, particle_mass, max_relative = EPS);
    assert_relative_eq!(nodal_momentum, particle_momentum, epsilon = EPS);
}

#[test]
fn uniform_velocity_survives_round_trip() {
    let velocity = Vector2::new(0.3, -1.2);
    let mut mesh = grid_2d(2, 2, 1.0);
    seed_particles(&mut mesh, 2, 2, 1.0);
    mesh.iterate_over_particles(|particle| particle.velocity = velocity);
    mesh.locate_particles_mesh().unwrap();

    scatter_mass_and_momentum(&mut mesh);
    mesh.iterate_over_nodes(|node| node.compute_velocity(0));

    let (cells, nodes, particles) = mesh.parts_mut();
    for particle in particles {
        let cell = cells.get(particle.cell_id().unwrap()).unwrap();
        let xi = particle.local_coordinates().unwrap();
        let interpolated = cell.interpolate_nodal_velocity(nodes, &xi, 0).unwrap();
        assert_relative_eq!(interpolated, velocity, epsilon = EPS);
    }
}

#[test]
fn free_fall_step() {
    let gravity = Vector2::new(0.0, -9.81);
    let dt = 1.0e-3;
    let mut mesh = grid_2d(2, 1, 1.0);
    seed_particles(&mut mesh, 2, 1, 1.0);
    mesh.locate_particles_mesh().unwrap();

    mesh.iterate_over_nodes(|node| node.initialise());
    {
        let (cells, nodes, particles) = mesh.parts_mut();
        for particle in particles {
            let cell = cells.get(particle.cell_id().unwrap()).unwrap();
            let xi = particle.local_coordinates().unwrap();
            cell.map_particle_mass_to_nodes(nodes, &xi, 0, particle.mass).unwrap();
            cell.compute_nodal_body_force(nodes, &xi, 0, particle.mass, &gravity)
                .unwrap();
        }
    }
    mesh.iterate_over_nodes(|node| {
        node.compute_velocity(0);
        node.compute_acceleration_velocity(0, dt);
    });

    let (cells, nodes, particles) = mesh.parts_mut();
    for particle in particles {
        let cell = cells.get(particle.cell_id().unwrap()).unwrap();
        let xi = particle.local_coordinates().unwrap();
        particle.acceleration = cell.interpolate_nodal_acceleration(nodes, &xi, 0).unwrap();
        particle.velocity = cell.interpolate_nodal_velocity(nodes, &xi, 0).unwrap();
        assert_relative_eq!(particle.acceleration, gravity, epsilon = EPS);
        assert_relative_eq!(particle.velocity, gravity * dt, epsilon = EPS);
    }
}

#[test]
fn uniform_stress_is_self_equilibrated() {
    let stress = VoigtStress::new(-2.0e3, -1.0e3, -1.5e3, 4.0e2, 0.0, 0.0);
    let mut mesh = grid_2d(2, 2, 1.0);
    seed_particles(&mut mesh, 2, 2, 1.0);
    mesh.iterate_over_particles(|particle| particle.stress = stress);
    mesh.locate_particles_mesh().unwrap();

    let (cells, nodes, particles) = mesh.parts_mut();
    for particle in particles {
        let cell = cells.get(particle.cell_id().unwrap()).unwrap();
        let xi = particle.local_coordinates().unwrap();
        cell.compute_nodal_internal_force(nodes, &xi, 0, particle.volume, &particle.stress)
            .unwrap();
    }

    let total = mesh
        .nodes()
        .values()
        .fold(Vector2::zeros(), |sum, node| sum + node.internal_force(0));
    assert_relative_eq!(total, Vector2::zeros(), epsilon = 1e-6);

    // The centre node is shared by all four cells.
    let centre = mesh.node(4).unwrap().internal_force(0);
    assert_relative_eq!(centre, Vector2::zeros(), epsilon = 1e-6);

    // A corner node is pushed outward by compression.
    let corner = mesh.node(0).unwrap().internal_force(0);
    assert!(corner.x < 0.0 && corner.y < 0.0);
}

#[test]
fn migrating_particles_follow_their_cells() {
    let mut mesh = grid_2d(3, 3, 1.0);
    seed_particles(&mut mesh, 3, 3, 1.0);
    mesh.locate_particles_mesh().unwrap();

    mesh.iterate_over_particles(|particle| {
        let shifted = particle.coordinates() + Vector2::new(1.0, 0.0);
        particle.assign_coordinates(shifted);
    });
    let report = mesh.locate_particles_mesh().unwrap();

    // The rightmost column leaves the mesh.
    assert_eq!(report.unlocated.len(), 12);
    for row in 0..3 {
        assert_eq!(mesh.cell(row * 3).unwrap().nparticles(), 0);
        assert_eq!(mesh.cell(row * 3 + 1).unwrap().nparticles(), 4);
        assert_eq!(mesh.cell(row * 3 + 2).unwrap().nparticles(), 4);
    }
    let assigned: usize = mesh.cells().values().map(|cell| cell.nparticles()).sum();
    assert_eq!(assigned, mesh.particles().filter(|p| p.is_located()).count());
}

#[test]
fn hexahedral_mesh_locates_and_scatters() {
    let mut mesh: Mesh<3> = Mesh::new(1);
    let mut id = 0;
    for k in 0..2 {
        for j in 0..2 {
            for i in 0..3 {
                mesh.add_node(Node::new(id, Vector3::new(i as f64, j as f64, k as f64)));
                id += 1;
            }
        }
    }
    let node = |i: usize, j: usize, k: usize| k * 6 + j * 3 + i;
    for c in 0..2 {
        let mut cell = Cell::with_shapefn(c, 8, ShapeFn::Hexahedron8).unwrap();
        let corners = [
            node(c, 0, 0),
            node(c + 1, 0, 0),
            node(c + 1, 1, 0),
            node(c, 1, 0),
            node(c, 0, 1),
            node(c + 1, 0, 1),
            node(c + 1, 1, 1),
            node(c, 1, 1),
        ];
        for (local, &node_id) in corners.iter().enumerate() {
            cell.add_node(local, node_id);
        }
        cell.add_neighbour(0, 1 - c);
        mesh.add_cell(cell);
    }
    mesh.compute_cell_volumes().unwrap();
    assert_relative_eq!(mesh.cell(0).unwrap().volume().unwrap(), 1.0, epsilon = EPS);

    mesh.add_particle(Particle::new(0, Vector3::new(0.25, 0.5, 0.75)).with_mass(2.0));
    mesh.add_particle(Particle::new(1, Vector3::new(1.75, 0.1, 0.9)).with_mass(3.0));
    mesh.add_particle(Particle::new(2, Vector3::new(2.5, 0.5, 0.5)));
    let report = mesh.locate_particles_mesh().unwrap();

    assert_eq!(report.unlocated, vec![2]);
    assert_eq!(mesh.particle(0).unwrap().cell_id(), Some(0));
    assert_eq!(mesh.particle(1).unwrap().cell_id(), Some(1));
    assert_relative_eq!(
        mesh.particle(1).unwrap().local_coordinates().unwrap(),
        Vector3::new(0.5, -0.8, 0.8),
        epsilon = EPS
    );

    let (cells, nodes, particles) = mesh.parts_mut();
    for particle in particles.filter(|p| p.is_located()) {
        let cell = cells.get(particle.cell_id().unwrap()).unwrap();
        let xi = particle.local_coordinates().unwrap();
        cell.map_particle_mass_to_nodes(nodes, &xi, 0, particle.mass).unwrap();
    }
    let nodal_mass: f64 = mesh.nodes().values().map(|node| node.mass(0)).sum();
    assert_relative_eq!(nodal_mass, 5.0, max_relative = EPS);
}
