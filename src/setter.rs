//! Property setters: how new props reach a loaded block.

use tracing::debug;

use crate::bundle::Flavor;
use crate::error::FrameError;
use crate::frame::Frame;
use crate::props::Properties;
use crate::realm::Realm;

/// Pushes properties into the loaded block component
pub trait SetProps<R: Realm> {
    fn set_props(
        &mut self,
        frame: &mut Frame<R>,
        props: &Properties,
        callbacks: &[String],
    ) -> Result<(), FrameError>;
}

/// Renders a hosted component into the page's persistent root, inside the
/// host theme and baseline styles, with a `BlockComponent` helper for nested
/// blocks.
#[derive(Debug, Default)]
pub struct HostedSetter;

impl<R: Realm> SetProps<R> for HostedSetter {
    fn set_props(
        &mut self,
        frame: &mut Frame<R>,
        props: &Properties,
        callbacks: &[String],
    ) -> Result<(), FrameError> {
        frame.rendering_root()?;
        frame
            .realm_mut()
            .render(Flavor::Hosted, props, callbacks)?;
        Ok(())
    }
}

/// Calls a framework-free bundle's `default` export with the props.
///
/// Framework-free blocks get no nested-block helper.
#[derive(Debug, Default)]
pub struct VanillaSetter;

impl<R: Realm> SetProps<R> for VanillaSetter {
    fn set_props(
        &mut self,
        frame: &mut Frame<R>,
        props: &Properties,
        callbacks: &[String],
    ) -> Result<(), FrameError> {
        frame
            .realm_mut()
            .render(Flavor::FrameworkFree, props, callbacks)?;
        Ok(())
    }
}

/// Build the setter for an injected bundle.
///
/// # Errors
/// [`FrameError::UnknownFlavor`] if `bundle_name` names neither flavor, or the
/// realm's error if the component can't be instantiated.
pub fn make_setter<R: Realm>(
    frame: &mut Frame<R>,
    bundle_name: &str,
) -> Result<Box<dyn SetProps<R>>, FrameError> {
    let flavor = Flavor::from_export_name(bundle_name)?;
    debug!(?flavor, "building property setter");
    match flavor {
        Flavor::Hosted => {
            frame.realm_mut().instantiate(flavor)?;
            Ok(Box::new(HostedSetter))
        }
        Flavor::FrameworkFree => Ok(Box::new(VanillaSetter)),
    }
}
