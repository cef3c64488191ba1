//! Tour of the public API: factor a few small matrices and print results.
//!
//! Run with `cargo run -p densolve --example walkthrough`.

use densolve::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> Result<()> {
    let a = matrix![[3.0, 2.0, 1.0], [2.0, 3.0, 2.0], [1.0, 2.0, 3.0]];
    let b = Vector::from_vec(vec![1.0, 2.0, 3.0]);
    println!("A = {a}");

    let sol = linalg::solve(&a, &b)?;
    println!(
        "solve: x = {} via {} ({}), residual {:.2e}",
        sol.x(),
        sol.method(),
        sol.status(),
        sol.residual_norm()
    );

    let lu = a.lu()?;
    println!("det(A) = {:.6}", lu.det());
    println!("L = {}", lu.l());
    println!("U = {}", lu.u());

    let eig = a.eigen_symmetric()?;
    println!(
        "eigenvalues = {} after {} sweeps",
        eig.eigenvalues_vector(),
        eig.sweeps()
    );

    let svd = a.svd()?;
    println!(
        "singular values = {}, cond = {:.4}",
        svd.s(),
        svd.condition_number()
    );

    // Overdetermined least squares.
    let tall = matrix![[1.0, 2.0, 1.0], [2.0, 1.0, 3.0], [1.0, 3.0, 2.0], [3.0, 1.0, 1.0]];
    let rhs = Vector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
    let ls = linalg::solve_least_squares(&tall, &rhs)?;
    println!(
        "least squares: x = {}, rank {:?}, residual {:.6}",
        ls.x(),
        ls.rank(),
        ls.residual_norm()
    );

    // A singular system still produces a result, flagged by its status.
    let singular = matrix![[1.0, 2.0], [2.0, 4.0]];
    let flagged = singular.lu()?;
    println!("LU of {singular}: {}", flagged.status());

    // Hard failures come back as errors.
    let not_sym = matrix![[1.0, 2.0], [3.0, 4.0]];
    if let Err(err) = not_sym.cholesky() {
        println!("cholesky: {err} ({})", err.status());
    }

    // Complex eigenvalues of a rotation-like matrix.
    let cyclic = matrix![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    for z in cyclic.eigenvalues()?.eigenvalues() {
        println!("  lambda = {:.6} {:+.6}i", z.re, z.im);
    }

    // Random SPD system, solved with a tighter tolerance.
    let mut rng = StdRng::seed_from_u64(7);
    let spd = Matrix::random_spd(6, &mut rng);
    let rhs = Vector::from_vec((1..=6).map(f64::from).collect());
    let opts = Options::default().with_tolerance(1e-12);
    let sol = linalg::solve_with(&spd, &rhs, &opts)?;
    println!("random SPD: method {}, residual {:.2e}", sol.method(), sol.residual_norm());

    Ok(())
}
