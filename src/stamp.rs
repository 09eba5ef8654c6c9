//! Metadata stamping
//!
//! Marks the elements of a package tree with the stereotypes the generator
//! expects: the schema root, element classes, data types and attributes.
//! Element stereotypes are only added when missing; attribute stereotypes are
//! re-applied on every run, which relies on the store's `add_stereotype`
//! being idempotent.

use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{Element, ElementBody, ElementId, ModelReader, ModelWriter};
use crate::vocabulary::Vocabulary;

/// What one stamping run touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StampReport {
    pub packages: usize,
    pub classifiers: usize,
    pub stereotypes_added: usize,
    pub attributes_stamped: usize,
}

/// Stamps a package tree through a model store
pub struct MetadataStamper<'v> {
    vocabulary: &'v Vocabulary,
}

impl<'v> MetadataStamper<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Stamp every classifier under `package`, treating `root` as the schema root
    pub fn stamp<M>(&self, model: &mut M, package: &ElementId, root: &ElementId) -> Result<StampReport>
    where
        M: ModelReader + ModelWriter,
    {
        let mut report = StampReport::default();
        let mut visited = HashSet::new();
        self.stamp_package(model, package, root, &mut visited, &mut report)?;

        if !visited.contains(root) {
            let element = model.element(root)?;
            self.stamp_classifier(model, &element, root, &mut report)?;
        }

        info!(
            packages = report.packages,
            classifiers = report.classifiers,
            added = report.stereotypes_added,
            attributes = report.attributes_stamped,
            "stamping complete"
        );
        Ok(report)
    }

    fn stamp_package<M>(
        &self,
        model: &mut M,
        package: &ElementId,
        root: &ElementId,
        visited: &mut HashSet<ElementId>,
        report: &mut StampReport,
    ) -> Result<()>
    where
        M: ModelReader + ModelWriter,
    {
        if !visited.insert(package.clone()) {
            return Ok(());
        }
        let members = match model.element(package)?.body {
            ElementBody::Package { members } => members,
            _ => return Ok(()),
        };
        report.packages += 1;

        for member in &members {
            let element = model.element(member)?;
            if element.is_package() {
                self.stamp_package(model, member, root, visited, report)?;
            } else if visited.insert(member.clone()) {
                self.stamp_classifier(model, &element, root, report)?;
            }
        }
        Ok(())
    }

    fn stamp_classifier<M>(
        &self,
        model: &mut M,
        element: &Element,
        root: &ElementId,
        report: &mut StampReport,
    ) -> Result<()>
    where
        M: ModelReader + ModelWriter,
    {
        report.classifiers += 1;
        let vocabulary = self.vocabulary;

        let stereotype = if &element.id == root {
            Some(&vocabulary.schema_root)
        } else if element.is_data_type() {
            Some(&vocabulary.data_type)
        } else if element.is_class() {
            Some(&vocabulary.element)
        } else {
            None
        };

        let mut changed = false;
        if let Some(stereotype) = stereotype {
            if !element.has_stereotype(stereotype) {
                debug!(element = %element.name, stereotype = %stereotype, "adding stereotype");
                model.add_stereotype(&element.id, &vocabulary.qualified(stereotype))?;
                report.stereotypes_added += 1;
                changed = true;
            }
        }

        let attribute_stereotype = vocabulary.qualified(&vocabulary.attribute);
        for attribute in element.attributes() {
            model.add_stereotype(&attribute.id, &attribute_stereotype)?;
            model.save(&attribute.id)?;
            report.attributes_stamped += 1;
        }

        if changed {
            model.save(&element.id)?;
        }
        Ok(())
    }
}

/// Stamp with a given vocabulary in one call
pub fn stamp<M>(model: &mut M, package: &ElementId, root: &ElementId, vocabulary: &Vocabulary) -> Result<StampReport>
where
    M: ModelReader + ModelWriter,
{
    MetadataStamper::new(vocabulary).stamp(model, package, root)
}
