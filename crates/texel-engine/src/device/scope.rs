/// Runs `f` inside a validation error scope on `device`.
///
/// Returns `f`'s value together with the first validation error the device
/// reported while it ran. Errors caught here never reach the device's
/// uncaptured-error handler.
pub fn with_validation<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let error = pollster::block_on(scope.pop());
    (value, error)
}
